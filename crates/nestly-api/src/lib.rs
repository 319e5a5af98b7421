// nestly-api: Async Rust client for the Nest cloud APIs (session, bucket store, cameras)

pub mod auth;
pub mod camera;
pub mod command;
pub mod error;
pub mod models;
pub mod retry;
pub mod session;
pub mod sync;
pub mod transport;

pub use auth::{CredentialProvider, Credentials, LoginMethod};
pub use command::{BucketPatch, PatchOp};
pub use error::Error;
pub use models::{AppLaunchResponse, Bucket, CameraProperties, CameraSummary};
pub use retry::RetryPolicy;
pub use session::Session;
pub use sync::BucketType;
pub use transport::{Endpoints, TransportConfig};
