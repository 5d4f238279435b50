//! Integration tests: full pipeline runs against in-memory collaborators.

mod discovery;
mod mock_probe;
mod recommend;
