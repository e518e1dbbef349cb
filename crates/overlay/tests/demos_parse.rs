//! Integration tests for parsing the demo RON configuration files.

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use keycombo::Platform;

    fn demos_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .parent() // crates
            .and_then(|p| p.parent()) // workspace root
            .expect("workspace root")
            .join("demos")
    }

    #[test]
    fn parse_all_demo_configs() {
        let mut found = 0usize;
        for entry in fs::read_dir(demos_dir()).expect("read demos dir") {
            let path = entry.unwrap().path();
            if path.extension().and_then(|s| s.to_str()) != Some("ron") {
                continue;
            }
            found += 1;
            let content = fs::read_to_string(&path).expect("read ron file");
            let parsed = config::load_from_str(&content, Some(&path));
            let fname = path.file_name().unwrap().to_string_lossy().to_string();
            assert!(
                parsed.is_ok(),
                "failed to parse {}: {}",
                fname,
                parsed.err().map(|e| e.pretty()).unwrap_or_default()
            );
        }
        assert!(found > 0, "no .ron files found in demos");
    }

    #[test]
    fn demo_config_overrides_apply() {
        let cfg = config::load_from_path(&demos_dir().join("config.ron")).expect("load");
        for platform in Platform::ALL {
            let table = cfg.shortcuts_config(platform);
            assert_eq!(table.bindings["screenshot"].key, "alt+shift+p");
            assert!(!table.bindings["system_audio"].enabled);
        }
        assert_eq!(
            cfg.shortcuts_config(Platform::MacOs).bindings["move_window"].key,
            "cmd+alt"
        );
    }
}
