//! Event pipeline
//!
//! Reads newline-delimited JSON events, runs each object through the
//! enrichment stage and writes it back out, one event per line, in input
//! order. Lines that are not JSON objects are logged and written through
//! untouched.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::watch;

use super::enrich::EnrichmentStage;
use crate::utils::json::json_type;

/// Per-run counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    /// Object events handed to the stage
    pub records: u64,
    /// Events that received the output key
    pub enriched: u64,
    /// Object events written back unchanged
    pub passed_through: u64,
    /// Lines that were not JSON objects
    pub invalid: u64,
}

pub struct EventPipeline {
    stage: Arc<EnrichmentStage>,
}

impl EventPipeline {
    pub fn new(stage: Arc<EnrichmentStage>) -> Self {
        Self { stage }
    }

    /// Process events until EOF or shutdown.
    ///
    /// The line in flight when shutdown fires is finished and written; no
    /// further input is read.
    pub async fn run<R, W>(
        &self,
        mut reader: R,
        mut writer: W,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> Result<PipelineSummary>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buf = Vec::new();
        let mut summary = PipelineSummary::default();
        let mut line_no: u64 = 0;
        let mut signal_open = true;

        if *shutdown_rx.borrow() {
            tracing::debug!("EventPipeline started after shutdown, nothing to do");
            return Ok(summary);
        }

        loop {
            // A cancelled read leaves its partial bytes in `buf`; the next read appends
            let read = tokio::select! {
                biased;
                changed = shutdown_rx.changed(), if signal_open => {
                    match changed {
                        Ok(()) if *shutdown_rx.borrow() => {
                            tracing::debug!("EventPipeline received shutdown, stopping");
                            break;
                        }
                        Ok(()) => continue,
                        Err(_) => {
                            signal_open = false;
                            continue;
                        }
                    }
                }
                read = reader.read_until(b'\n', &mut buf) => read.context("Failed to read input")?,
            };

            if read == 0 && buf.is_empty() {
                break;
            }
            line_no += 1;

            let line = trim_line_ending(&buf);
            if !line.trim_ascii().is_empty() {
                let output = self.handle_line(line, line_no, &mut summary).await?;
                writer
                    .write_all(&output)
                    .await
                    .context("Failed to write output")?;
                writer
                    .write_all(b"\n")
                    .await
                    .context("Failed to write output")?;
            }
            buf.clear();
        }

        writer.flush().await.context("Failed to flush output")?;

        let cache = self.stage.cache_stats();
        tracing::info!(
            records = summary.records,
            enriched = summary.enriched,
            passed_through = summary.passed_through,
            invalid = summary.invalid,
            cache_hits = cache.hits,
            cache_misses = cache.misses,
            cache_expirations = cache.expirations,
            cache_evictions = cache.evictions,
            "EventPipeline finished"
        );
        Ok(summary)
    }

    /// Enrich one line, or hand it back byte-for-byte when it is not a JSON object.
    async fn handle_line(
        &self,
        line: &[u8],
        line_no: u64,
        summary: &mut PipelineSummary,
    ) -> Result<Vec<u8>> {
        let text = match std::str::from_utf8(line) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(line = line_no, error = %e, "Input line is not valid UTF-8, passing it through");
                summary.invalid += 1;
                return Ok(line.to_vec());
            }
        };

        let mut event = match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(event)) => event,
            Ok(other) => {
                tracing::error!(
                    line = line_no,
                    kind = json_type(&other),
                    "Input line is not a JSON object, passing it through"
                );
                summary.invalid += 1;
                return Ok(line.to_vec());
            }
            Err(e) => {
                tracing::error!(line = line_no, error = %e, "Invalid JSON, passing line through");
                summary.invalid += 1;
                return Ok(line.to_vec());
            }
        };

        summary.records += 1;
        if self.stage.process(&mut event).await.is_enriched() {
            summary.enriched += 1;
        } else {
            summary.passed_through += 1;
        }

        serde_json::to_vec(&event).context("Failed to serialize event")
    }
}

/// Strip a trailing `\n` or `\r\n`.
fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::cache::{CacheConfig, TtlLruCache};
    use crate::domain::enrich::{RecordingDiagnostics, Settings, StageConfig};
    use crate::domain::enrich::testing::{StaticLookup, google_dns};
    use tokio::io::BufReader;

    fn pipeline() -> EventPipeline {
        let config = StageConfig {
            fields: Some(vec!["city".to_string(), "country_name".to_string()]),
            ..Default::default()
        };
        let stage = EnrichmentStage::new(
            Settings::validate(config).unwrap(),
            Arc::new(StaticLookup::new().with("8.8.8.8", google_dns())),
            Arc::new(TtlLruCache::new(&CacheConfig::default())),
            Arc::new(RecordingDiagnostics::new()),
        );
        EventPipeline::new(Arc::new(stage))
    }

    async fn run_bytes(input: &[u8]) -> (PipelineSummary, Vec<u8>) {
        let (_tx, rx) = watch::channel(false);
        let mut output = Vec::new();
        let summary = pipeline()
            .run(BufReader::new(input), &mut output, rx)
            .await
            .unwrap();
        (summary, output)
    }

    async fn run(input: &str) -> (PipelineSummary, Vec<String>) {
        let (summary, output) = run_bytes(input.as_bytes()).await;
        let lines = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect();
        (summary, lines)
    }

    #[tokio::test]
    async fn test_enriches_each_line_in_order() {
        let input = concat!(
            r#"{"ip_address":"8.8.8.8","seq":1}"#,
            "\n",
            r#"{"seq":2}"#,
            "\n",
            r#"{"ip_address":null,"seq":3}"#,
            "\n",
        );
        let (summary, lines) = run(input).await;

        assert_eq!(
            summary,
            PipelineSummary {
                records: 3,
                enriched: 1,
                passed_through: 2,
                invalid: 0,
            }
        );
        assert_eq!(
            lines,
            vec![
                r#"{"ip_address":"8.8.8.8","seq":1,"ipinfo":{"city":"Mountain View","country_name":"United States"}}"#,
                r#"{"seq":2}"#,
                r#"{"ip_address":null,"seq":3}"#,
            ]
        );
    }

    #[tokio::test]
    async fn test_invalid_lines_pass_through_verbatim() {
        let input = "not json\n[1,2]\n\n{\"ip_address\":\"8.8.8.8\"}";
        let (summary, lines) = run(input).await;

        assert_eq!(summary.invalid, 2);
        assert_eq!(summary.records, 1);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "not json");
        assert_eq!(lines[1], "[1,2]");
        assert!(lines[2].contains("Mountain View"));
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_passes_through() {
        let mut input = Vec::new();
        input.extend_from_slice(b"{\"ip_address\":\"8.8.8.8\",\"seq\":1}\n");
        input.extend_from_slice(b"{\"msg\":\"caf\xe9\"}\n");
        input.extend_from_slice(b"{\"ip_address\":\"8.8.8.8\",\"seq\":3}\n");

        let (summary, output) = run_bytes(&input).await;

        assert_eq!(summary.invalid, 1);
        assert_eq!(summary.records, 2);
        assert_eq!(summary.enriched, 2);

        let lines: Vec<&[u8]> = output.split(|b| *b == b'\n').collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with(b"{\"ip_address\":\"8.8.8.8\",\"seq\":1,\"ipinfo\""));
        assert_eq!(lines[1], b"{\"msg\":\"caf\xe9\"}");
        assert!(lines[2].starts_with(b"{\"ip_address\":\"8.8.8.8\",\"seq\":3,\"ipinfo\""));
        assert!(lines[3].is_empty());
    }

    #[tokio::test]
    async fn test_crlf_line_endings() {
        let input = "{\"ip_address\":\"8.8.8.8\"}\r\n\r\n{\"a\":1}\r\n";
        let (summary, lines) = run(input).await;

        assert_eq!(summary.records, 2);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Mountain View"));
        assert_eq!(lines[1], r#"{"a":1}"#);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let (summary, lines) = run("").await;
        assert_eq!(summary, PipelineSummary::default());
        assert!(lines.is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_before_start_reads_nothing() {
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();

        let mut output = Vec::new();
        let summary = pipeline()
            .run(
                BufReader::new(r#"{"ip_address":"8.8.8.8"}"#.as_bytes()),
                &mut output,
                rx,
            )
            .await
            .unwrap();

        assert_eq!(summary.records, 0);
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn test_dropped_shutdown_sender_does_not_stop_pipeline() {
        let (tx, rx) = watch::channel(false);
        drop(tx);

        let mut output = Vec::new();
        let summary = pipeline()
            .run(
                BufReader::new("{\"ip_address\":\"8.8.8.8\"}\n{\"a\":1}\n".as_bytes()),
                &mut output,
                rx,
            )
            .await
            .unwrap();

        assert_eq!(summary.records, 2);
        assert_eq!(summary.enriched, 1);
    }
}
