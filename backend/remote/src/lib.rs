pub mod supabase;
pub mod unconfigured;

pub use supabase::SupabaseRemote;
pub use unconfigured::{UnconfiguredRemote, INSERT_UNCONFIGURED_MESSAGE, UPLOAD_UNCONFIGURED_MESSAGE};
