//! An interactive browse session.
//!
//! One task drives everything: the single dataset load and the stream of
//! search input run side by side, so typing stays live while the load is
//! in flight. Each input line is one change of the search box.

use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::time::{sleep_until, Instant};
use tracing::debug;

use crate::dataset::LoadState;
use crate::debounce::Debouncer;
use crate::directory::Directory;
use crate::error::Result;
use crate::loader::Loader;
use crate::store::DocumentStore;
use crate::surface::DisplaySurface;

/// What happened during a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    /// Final state of the dataset load.
    pub state: LoadState,
    /// Number of filter and render cycles run for search input.
    pub searches: usize,
    /// Cards visible when the session ended.
    pub visible: usize,
}

/// Run a session until `input` is exhausted and the load has resolved.
///
/// # Errors
///
/// Returns an error if reading `input` fails. Load failures are shown on
/// the surface, not returned.
pub async fn run_session<D, S, R>(
    directory: &mut Directory<D>,
    loader: &Loader<S>,
    input: R,
    debounce: Option<Duration>,
) -> Result<SessionSummary>
where
    D: DisplaySurface,
    S: DocumentStore,
    R: AsyncBufRead + Unpin,
{
    let ticket = directory.begin_load();
    let load = loader.load();
    tokio::pin!(load);

    let mut lines = input.lines();
    let mut debouncer = Debouncer::new(debounce);
    let mut load_done = false;
    let mut input_done = false;
    let mut searches = 0;

    loop {
        let deadline = debouncer.deadline();
        tokio::select! {
            biased;

            outcome = &mut load, if !load_done => {
                load_done = true;
                directory.finish_load(ticket, outcome);
            }

            () = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                if let Some(term) = debouncer.take_due(Instant::now()) {
                    directory.on_search_input(&term);
                    searches += 1;
                }
            }

            line = lines.next_line(), if !input_done => {
                let term = match line? {
                    Some(text) => debouncer.push(text, Instant::now()),
                    None => {
                        debug!("Search input closed");
                        input_done = true;
                        debouncer.flush()
                    }
                };
                if let Some(term) = term {
                    directory.on_search_input(&term);
                    searches += 1;
                }
            }

            else => break,
        }
    }

    Ok(SessionSummary {
        state: directory.cache().state(),
        searches,
        visible: directory.visible_count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::facility::Document;
    use crate::render::NO_RESULTS_MESSAGE;
    use crate::store::testing::FailingStore;
    use crate::store::MemoryStore;
    use crate::surface::MemorySurface;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    fn doc(id: &str, fields: Value) -> Document {
        match fields {
            Value::Object(map) => Document::new(id, map),
            other => panic!("fields must be an object, got {other}"),
        }
    }

    fn loader() -> Loader<MemoryStore> {
        Loader::new(
            MemoryStore::with_collection(
                "unidades_saude",
                vec![
                    doc("1", json!({"nome": "UBS Centro", "bairro": "Centro", "servicos": ["Vacina"]})),
                    doc("2", json!({"nome": "UPA Norte", "bairro": "Zona Norte", "servicos": ["Raio-X"]})),
                ],
            ),
            "unidades_saude",
        )
    }

    #[tokio::test]
    async fn test_session_runs_each_line() {
        let mut directory = Directory::new(MemorySurface::new());
        let summary = run_session(&mut directory, &loader(), &b"ubs\nnorte\n"[..], None)
            .await
            .unwrap();

        assert_eq!(summary.state, LoadState::Ready);
        assert_eq!(summary.searches, 2);
        assert_eq!(summary.visible, 1);
        assert!(directory.surface().content().contains("UPA Norte"));
    }

    #[tokio::test]
    async fn test_session_without_input_shows_full_list() {
        let mut directory = Directory::new(MemorySurface::new());
        let summary = run_session(&mut directory, &loader(), &b""[..], None)
            .await
            .unwrap();

        assert_eq!(summary.searches, 0);
        assert_eq!(summary.visible, 2);
    }

    #[tokio::test]
    async fn test_session_load_failure() {
        let mut directory = Directory::new(MemorySurface::new());
        let loader = Loader::new(FailingStore, "unidades_saude");
        let summary = run_session(&mut directory, &loader, &b""[..], None)
            .await
            .unwrap();

        assert_eq!(summary.state, LoadState::Failed);
        assert!(directory
            .surface()
            .content()
            .contains("Erro ao conectar com o banco de dados."));
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_debounce_collapses_burst() {
        let mut directory = Directory::new(MemorySurface::new());
        let summary = run_session(
            &mut directory,
            &loader(),
            &b"c\nce\ncentro\n"[..],
            Some(Duration::from_millis(300)),
        )
        .await
        .unwrap();

        assert_eq!(summary.searches, 1);
        assert_eq!(directory.term(), "centro");
        assert_eq!(summary.visible, 1);
    }

    /// Resolves only after a delay, so input arrives first.
    #[derive(Debug)]
    struct SlowStore(MemoryStore);

    #[async_trait]
    impl DocumentStore for SlowStore {
        fn name(&self) -> &'static str {
            "slow"
        }

        async fn fetch_all(&self, collection: &str) -> Result<Vec<Document>> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            self.0.fetch_all(collection).await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_during_load_then_full_render() {
        let mut directory = Directory::new(MemorySurface::new());
        let store = SlowStore(
            MemoryStore::with_collection("c", vec![doc("1", json!({"nome": "UBS Centro"}))]),
        );
        let loader = Loader::new(store, "c");

        let summary = run_session(&mut directory, &loader, &b"ubs\n"[..], None)
            .await
            .unwrap();

        assert_eq!(summary.searches, 1);
        assert_eq!(summary.state, LoadState::Ready);
        // the completed load replaces the early no-results render
        assert_eq!(summary.visible, 1);
        assert!(!directory.surface().content().contains(NO_RESULTS_MESSAGE));
    }

    #[derive(Debug)]
    struct BrokenInput;

    impl tokio::io::AsyncRead for BrokenInput {
        fn poll_read(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
            _buf: &mut tokio::io::ReadBuf<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Err(std::io::Error::other("tty gone")))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_input_error_is_returned() {
        let mut directory = Directory::new(MemorySurface::new());
        let store = SlowStore(MemoryStore::new());
        let loader = Loader::new(store, "c");
        let input = tokio::io::BufReader::new(BrokenInput);

        let err = run_session(&mut directory, &loader, input, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
