mod access_gate;
mod expiry_props;
mod token_endpoint;
