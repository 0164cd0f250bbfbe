pub mod feed;
pub mod supabase;

pub use feed::{diff_snapshots, poll_changes};
pub use supabase::SupabaseBackend;
