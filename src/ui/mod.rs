pub mod icons;
pub mod output;
pub mod progress;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{banner, info, success, summary_row};
pub use progress::Spinner;
pub use table::{repos_table, stats_table, TableBuilder};
pub use theme::{theme, Theme};
