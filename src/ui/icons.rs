pub struct Icons;

impl Icons {
    pub const CHECK: &str = "✅";
    pub const INFO: &str = "ℹ️";
    pub const STATS: &str = "📊";
    pub const EMPTY: &str = "∅";
}
