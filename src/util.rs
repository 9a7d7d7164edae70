use std::path::{Path, PathBuf};

static INIT_ONCE: std::sync::Once = std::sync::Once::new();

/// Install the `tracing` subscriber once; `RUST_LOG` overrides the `info` default.
pub fn init_tracing_once() {
    INIT_ONCE.call_once(|| {
        let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

/// `<dir>/<c1>_<c2>_..._<cn>.csv`, skipping missing or blank components.
pub fn output_filename(dir: &Path, components: &[Option<String>]) -> PathBuf {
    let stem = components
        .iter()
        .flatten()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    let stem = if stem.is_empty() { "output".to_string() } else { stem };
    dir.join(format!("{}.csv", stem))
}

/// Base path plus suffix, e.g. `data/myth_x` + `-results.csv`.
pub fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut s = base.as_os_str().to_os_string();
    s.push(suffix);
    PathBuf::from(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_skips_missing_parts() {
        let p = output_filename(
            Path::new("out"),
            &[None, None, Some("election2020".into()), Some("Sample".into()), Some("5".into()), Some("full_text".into())],
        );
        assert_eq!(p, PathBuf::from("out/election2020_Sample_5_full_text.csv"));
        assert_eq!(output_filename(Path::new("o"), &[None]), PathBuf::from("o/output.csv"));
    }

    #[test]
    fn suffix_appends_to_base() {
        assert_eq!(with_suffix(Path::new("data/myth_x"), "-results.csv"), PathBuf::from("data/myth_x-results.csv"));
    }
}
