use tabled::{settings::Style, Table, Tabled};
use crate::record::RepoRecord;

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

pub fn stats_table(stats: &[(&str, &str)]) -> String {
    let mut builder = TableBuilder::new();
    for (label, value) in stats {
        builder.add_row(label, value);
    }
    builder.build()
}

/// One repository in a results table
#[derive(Tabled)]
pub struct RepoRow {
    #[tabled(rename = "#")]
    pub rank: u64,
    #[tabled(rename = "Stars")]
    pub stars: u32,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Owner")]
    pub owner: String,
    #[tabled(rename = "Language")]
    pub language: String,
    #[tabled(rename = "URL")]
    pub url: String,
}

impl RepoRow {
    pub fn new(rank: u64, record: &RepoRecord) -> Self {
        Self {
            rank,
            stars: record.stars,
            name: record.name.clone(),
            owner: record.username.clone().unwrap_or_else(|| "-".to_string()),
            language: record.language.clone().unwrap_or_else(|| "-".to_string()),
            url: record.url.clone(),
        }
    }
}

/// Render records as a table, numbering rows from `first_rank`
pub fn repos_table<'a>(records: impl IntoIterator<Item = &'a RepoRecord>, first_rank: u64) -> String {
    let rows: Vec<RepoRow> = records
        .into_iter()
        .enumerate()
        .map(|(i, record)| RepoRow::new(first_rank + i as u64, record))
        .collect();
    if rows.is_empty() {
        return String::new();
    }
    Table::new(rows).with(Style::rounded()).to_string()
}
