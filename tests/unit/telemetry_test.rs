// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

#[cfg(test)]
mod tests {
    use safe_stringify::config::settings::Settings;
    use safe_stringify::domain::models::value_graph::Node;
    use safe_stringify::domain::services::stringify_service::CycleSafeSerializer;
    use safe_stringify::utils::telemetry;
    use serde_json::json;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing::Level;
    use tracing_subscriber::fmt::MakeWriter;

    /// 把日志写入共享缓冲区，便于断言
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            let buf = self.0.lock().unwrap_or_else(|e| e.into_inner());
            String::from_utf8_lossy(&buf).into_owned()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_telemetry_initialization_is_repeatable() {
        let settings = Settings::from_toml_str("").unwrap();
        telemetry::init_telemetry_with(&settings.logging);
        // 重复初始化不应 panic
        telemetry::init_telemetry();
        tracing::info!(component = "telemetry_test", "Telemetry initialized");
    }

    #[test]
    fn test_log_graph_emits_report_and_omissions() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_max_level(Level::TRACE)
            .with_ansi(false)
            .finish();

        let shared = Node::from(json!({"rooms": 3}));
        let listing = Node::object();
        listing.set("primary", shared.clone()).unwrap();
        listing.set("duplicate", shared).unwrap();

        tracing::subscriber::with_default(subscriber, || {
            CycleSafeSerializer::new().log_graph("listing_snapshot", &listing);
        });

        let output = logs.contents();
        assert!(output.contains("DEBUG"), "{output}");
        assert!(output.contains("listing_snapshot"), "{output}");
        assert!(output.contains("containers_visited=2"), "{output}");
        assert!(output.contains("references_omitted=1"), "{output}");
        assert!(output.contains("\"rooms\": 3"), "{output}");
        assert!(!output.contains("duplicate"), "{output}");

        assert!(output.contains("TRACE"), "{output}");
        assert!(output.contains("Omitting already visited container"), "{output}");
        assert!(output.contains("kind=\"object\""), "{output}");
    }
}
