use std::sync::OnceLock;

static QUIET: OnceLock<bool> = OnceLock::new();

pub fn is_quiet() -> bool {
    *QUIET.get_or_init(|| {
        std::env::var("REPOCACHE_QUIET")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    })
}

/// How CLI commands report their results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    pub fn from_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Human }
    }

    pub fn is_human(&self) -> bool {
        *self == Self::Human
    }
}

/// Machine-readable envelope for a successful command
pub fn success_envelope(command: &str, data: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "ok": true,
        "command": command,
        "data": data,
    })
}

pub fn emit_success(command: &str, data: serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(&success_envelope(command, data))?);
    Ok(())
}

pub fn emit_error(command: &str, err: &anyhow::Error) {
    let value = serde_json::json!({
        "ok": false,
        "command": command,
        "error": err.to_string(),
    });
    println!("{}", value);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope() {
        let value = success_envelope("stats", serde_json::json!({ "repos": 3 }));
        assert_eq!(value["ok"], true);
        assert_eq!(value["command"], "stats");
        assert_eq!(value["data"]["repos"], 3);
    }

    #[test]
    fn test_output_mode_from_flag() {
        assert!(OutputMode::from_flag(false).is_human());
        assert_eq!(OutputMode::from_flag(true), OutputMode::Json);
    }
}
