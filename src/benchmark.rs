//! The aggregation store.
//!
//! A [`Benchmark`] owns a tree of named nodes, each accumulating the duration
//! samples recorded under one description path, plus a typed subscription
//! list notified once per recording call. Stores are constructed explicitly
//! and passed around; there is no hidden global instance.
//!
//! The tree is a node-id arena: nodes live in one `Vec` and refer to their
//! children by index, which keeps ownership flat and preserves insertion
//! order at every level.

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::debug;

use crate::engine;
use crate::error::Error;
use crate::measurement::Measurement;
use crate::options::{MeasureOptions, WorkOutput};
use crate::report;
use crate::verify;

/// Ordered key sequence locating a measurement in the aggregation tree.
///
/// A single string converts into a one-element path; nested suites use
/// arrays or vectors of segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path(Vec<String>);

impl Path {
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Path {
    fn from(segment: &str) -> Self {
        Path(vec![segment.to_owned()])
    }
}

impl From<String> for Path {
    fn from(segment: String) -> Self {
        Path(vec![segment])
    }
}

impl From<Vec<String>> for Path {
    fn from(segments: Vec<String>) -> Self {
        Path(segments)
    }
}

impl From<&[&str]> for Path {
    fn from(segments: &[&str]) -> Self {
        Path(segments.iter().map(|s| (*s).to_owned()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Path {
    fn from(segments: [&str; N]) -> Self {
        Path(segments.iter().map(|s| (*s).to_owned()).collect())
    }
}

/// One tree node: the samples contributed directly at its path segment plus
/// child node ids in insertion order.
pub(crate) struct Node {
    pub(crate) key: String,
    pub(crate) durations: Vec<f64>,
    pub(crate) children: Vec<usize>,
}

/// Listener for the record event. Receives the description path (empty for
/// anonymous recordings) and the measurement, synchronously, in registration
/// order, before verification runs.
pub type Listener = Box<dyn FnMut(&[String], &Measurement) + Send>;

/// Handle returned by [`Benchmark::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

/// Hierarchical store of duration samples keyed by description paths.
#[derive(Default)]
pub struct Benchmark {
    nodes: Vec<Node>,
    roots: Vec<usize>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl Benchmark {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time `work` under `description`, merge the samples into the tree,
    /// broadcast the measurement, then apply threshold verification.
    ///
    /// Verification is deliberately deferred until after the broadcast and
    /// the merge, so subscribers observe every recorded measurement even
    /// when it ultimately fails the call.
    pub async fn record<F, Fut>(
        &mut self,
        description: impl Into<Path>,
        work: F,
        options: &MeasureOptions,
    ) -> Result<Measurement, Error>
    where
        F: Fn() -> Fut,
        Fut: Future,
        Fut::Output: WorkOutput,
    {
        let path = description.into();
        if path.is_empty() {
            return Err(Error::InvalidArgument(
                "description path must not be empty".into(),
            ));
        }

        let measurement = engine::run(&work, options).await?;
        self.merge_at(path.segments(), measurement.samples());
        debug!(
            path = ?path.segments(),
            samples = measurement.samples().len(),
            "recorded measurement"
        );
        self.emit(path.segments(), &measurement);
        verify::check(&measurement, options)?;
        Ok(measurement)
    }

    /// Time `work` without persisting anything to the tree. The broadcast
    /// still fires, tagged with an empty path, and thresholds still apply.
    pub async fn record_anonymous<F, Fut>(
        &mut self,
        work: F,
        options: &MeasureOptions,
    ) -> Result<Measurement, Error>
    where
        F: Fn() -> Fut,
        Fut: Future,
        Fut::Output: WorkOutput,
    {
        let measurement = engine::run(&work, options).await?;
        self.emit(&[], &measurement);
        verify::check(&measurement, options)?;
        Ok(measurement)
    }

    /// Merge precomputed samples under a non-empty path. No broadcast, no
    /// verification; this is the hook for collaborators replaying persisted
    /// results into a fresh store.
    pub fn merge(&mut self, description: impl Into<Path>, samples: &[f64]) -> Result<(), Error> {
        let path = description.into();
        if path.is_empty() {
            return Err(Error::InvalidArgument(
                "description path must not be empty".into(),
            ));
        }
        self.merge_at(path.segments(), samples);
        Ok(())
    }

    fn merge_at(&mut self, segments: &[String], samples: &[f64]) {
        let mut current: Option<usize> = None;
        for segment in segments {
            let level = match current {
                None => &self.roots,
                Some(id) => &self.nodes[id].children,
            };
            let found = level
                .iter()
                .copied()
                .find(|&id| self.nodes[id].key == *segment);
            let id = match found {
                Some(id) => id,
                None => {
                    let id = self.nodes.len();
                    self.nodes.push(Node {
                        key: segment.clone(),
                        durations: Vec::new(),
                        children: Vec::new(),
                    });
                    match current {
                        None => self.roots.push(id),
                        Some(parent) => self.nodes[parent].children.push(id),
                    }
                    id
                }
            };
            current = Some(id);
        }
        if let Some(id) = current {
            self.nodes[id].durations.extend_from_slice(samples);
        }
    }

    /// Register a listener for the record event. Listeners run synchronously
    /// in registration order.
    pub fn subscribe(&mut self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Remove a listener. Returns whether it was still registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn emit(&mut self, path: &[String], measurement: &Measurement) {
        for (_, listener) in &mut self.listeners {
            listener(path, measurement);
        }
    }

    /// Render the tree as an indented textual report.
    pub fn report(&self) -> String {
        report::render(&self.nodes, &self.roots)
    }

    /// Serializable view of the tree: a nested mapping from path segments to
    /// `{ "durations": [...], "children": { ... } }`, in insertion order.
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            nodes: &self.nodes,
            level: &self.roots,
        }
    }
}

/// One level of the tree, borrowed for serialization.
pub struct Snapshot<'a> {
    nodes: &'a [Node],
    level: &'a [usize],
}

impl Serialize for Snapshot<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.level.len()))?;
        for &id in self.level {
            let node = &self.nodes[id];
            map.serialize_entry(
                &node.key,
                &NodeSnapshot {
                    durations: &node.durations,
                    children: Snapshot {
                        nodes: self.nodes,
                        level: &node.children,
                    },
                },
            )?;
        }
        map.end()
    }
}

#[derive(serde::Serialize)]
struct NodeSnapshot<'a> {
    durations: &'a [f64],
    children: Snapshot<'a>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn sleepy() -> impl Future<Output = ()> {
        tokio::time::sleep(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn path_and_prefix_coexist() {
        let mut bench = Benchmark::new();
        let options = MeasureOptions::builder().iterations(2).build();
        bench.record(["A", "B"], || async {}, &options).await.unwrap();
        bench.record("A", || async {}, &options).await.unwrap();

        let tree = serde_json::to_value(bench.snapshot()).unwrap();
        let a = &tree["A"];
        assert_eq!(a["durations"].as_array().unwrap().len(), 2);
        let b = &a["children"]["B"];
        assert_eq!(b["durations"].as_array().unwrap().len(), 2);
        assert!(b["children"].as_object().unwrap().is_empty());
    }

    #[tokio::test]
    async fn recording_order_does_not_matter() {
        let options = MeasureOptions::builder().iterations(1).build();

        let mut first = Benchmark::new();
        first.record("A", || async {}, &options).await.unwrap();
        first.record(["A", "B"], || async {}, &options).await.unwrap();

        let tree = serde_json::to_value(first.snapshot()).unwrap();
        assert_eq!(tree["A"]["durations"].as_array().unwrap().len(), 1);
        assert_eq!(
            tree["A"]["children"]["B"]["durations"].as_array().unwrap().len(),
            1
        );
    }

    #[test]
    fn direct_merge_appends_without_dedup() {
        let mut bench = Benchmark::new();
        bench.merge(["a", "b"], &[1.0, 2.0]).unwrap();
        bench.merge(["a", "b"], &[2.0]).unwrap();
        bench.merge("a", &[3.0]).unwrap();

        let tree = serde_json::to_value(bench.snapshot()).unwrap();
        assert_eq!(tree["a"]["durations"], serde_json::json!([3.0]));
        assert_eq!(
            tree["a"]["children"]["b"]["durations"],
            serde_json::json!([1.0, 2.0, 2.0])
        );
    }

    #[test]
    fn empty_path_is_rejected() {
        let mut bench = Benchmark::new();
        assert!(matches!(
            bench.merge(Vec::<String>::new(), &[1.0]),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn record_rejects_empty_path() {
        let mut bench = Benchmark::new();
        let result = bench
            .record(Vec::<String>::new(), || async {}, &MeasureOptions::default())
            .await;
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn event_fires_once_even_when_verification_fails() {
        let mut bench = Benchmark::new();
        let events: Arc<Mutex<Vec<(Vec<String>, usize)>>> = Arc::default();
        let seen = events.clone();
        bench.subscribe(Box::new(move |path, m| {
            seen.lock().unwrap().push((path.to_vec(), m.samples().len()));
        }));

        let options = MeasureOptions::builder().iterations(2).mean_under(0.001).build();
        let result = bench.record("slow", sleepy, &options).await;
        assert!(matches!(result, Err(Error::PerformanceExceeded { .. })));

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, vec!["slow".to_owned()]);
        assert_eq!(events[0].1, 2);
    }

    #[tokio::test]
    async fn anonymous_recording_broadcasts_empty_path_and_skips_tree() {
        let mut bench = Benchmark::new();
        let events: Arc<Mutex<Vec<Vec<String>>>> = Arc::default();
        let seen = events.clone();
        bench.subscribe(Box::new(move |path, _| {
            seen.lock().unwrap().push(path.to_vec());
        }));

        let options = MeasureOptions::builder().iterations(3).build();
        let m = bench.record_anonymous(|| async {}, &options).await.unwrap();
        assert_eq!(m.samples().len(), 3);
        assert_eq!(*events.lock().unwrap(), vec![Vec::<String>::new()]);
        assert_eq!(bench.report(), "");
    }

    #[tokio::test]
    async fn listeners_run_in_registration_order() {
        let mut bench = Benchmark::new();
        let order: Arc<Mutex<Vec<u8>>> = Arc::default();
        let first = order.clone();
        let second = order.clone();
        bench.subscribe(Box::new(move |_, _| first.lock().unwrap().push(1)));
        bench.subscribe(Box::new(move |_, _| second.lock().unwrap().push(2)));

        let options = MeasureOptions::builder().iterations(1).build();
        bench.record("x", || async {}, &options).await.unwrap();
        assert_eq!(*order.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn unsubscribe_stops_delivery() {
        let mut bench = Benchmark::new();
        let events: Arc<Mutex<Vec<()>>> = Arc::default();
        let seen = events.clone();
        let id = bench.subscribe(Box::new(move |_, _| seen.lock().unwrap().push(())));

        let options = MeasureOptions::builder().iterations(1).build();
        bench.record("x", || async {}, &options).await.unwrap();
        assert!(bench.unsubscribe(id));
        assert!(!bench.unsubscribe(id));
        bench.record("x", || async {}, &options).await.unwrap();

        assert_eq!(events.lock().unwrap().len(), 1);
    }

    #[test]
    fn snapshot_serializes_expected_shape() {
        let mut bench = Benchmark::new();
        bench.merge("x", &[1.5, 2.5]).unwrap();
        let json = serde_json::to_string(&bench.snapshot()).unwrap();
        assert_eq!(json, r#"{"x":{"durations":[1.5,2.5],"children":{}}}"#);
    }
}
