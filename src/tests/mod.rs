mod common;
mod external_token;
mod metadata_flow;
