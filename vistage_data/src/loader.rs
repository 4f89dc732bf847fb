// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The chart data loader.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::{DataError, DataFormat, DataSource, Dataset, Fetcher, parse_dataset};

/// Hook run on freshly parsed data before it becomes visible.
pub type AfterLoaded<'a> = &'a mut dyn FnMut(&mut Dataset) -> Result<(), DataError>;

/// Loaded data state.
#[derive(Clone, Debug, Default)]
pub enum LoadState {
    /// Nothing loaded yet.
    #[default]
    Idle,
    /// Data is available.
    Loaded(Arc<Dataset>),
    /// The last load failed; distinct from an empty dataset.
    Failed(Arc<DataError>),
}

impl LoadState {
    /// Whether data is available.
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

/// Outcome of a load, emitted once per distinct `(source, format)` pair.
#[derive(Clone, Debug)]
pub enum LoadEvent {
    /// Data loaded.
    Loaded {
        /// Number of rows.
        rows: usize,
    },
    /// Loading failed.
    Failed(Arc<DataError>),
}

/// Loads chart data once per distinct `(source, format)` pair.
#[derive(Debug, Default)]
pub struct DataLoader {
    last: Option<(DataSource, DataFormat)>,
    state: LoadState,
}

impl DataLoader {
    /// Creates an idle loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Loaded data, if any.
    pub fn dataset(&self) -> Option<&Arc<Dataset>> {
        match &self.state {
            LoadState::Loaded(d) => Some(d),
            _ => None,
        }
    }

    /// Last error, if the last load failed.
    pub fn error(&self) -> Option<&Arc<DataError>> {
        match &self.state {
            LoadState::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Whether data is available.
    pub fn is_loaded(&self) -> bool {
        self.state.is_loaded()
    }

    /// Loads `source` in `format`.
    ///
    /// Returns `None` without doing anything when the pair equals the last one loaded
    /// (successfully or not). Otherwise resolves, parses, runs `after_loaded`, and only
    /// then flips the state. There are no retries.
    pub fn load(
        &mut self,
        source: &DataSource,
        format: DataFormat,
        fetcher: &dyn Fetcher,
        after_loaded: Option<AfterLoaded<'_>>,
    ) -> Option<LoadEvent> {
        if self
            .last
            .as_ref()
            .is_some_and(|(s, f)| s == source && *f == format)
        {
            return None;
        }
        self.last = Some((source.clone(), format));

        let result = resolve(source, format, fetcher).and_then(|mut dataset| {
            if let Some(hook) = after_loaded {
                hook(&mut dataset)?;
            }
            Ok(dataset)
        });

        match result {
            Ok(dataset) => {
                let rows = dataset.len();
                debug!(rows, %format, "data loaded");
                self.state = LoadState::Loaded(Arc::new(dataset));
                Some(LoadEvent::Loaded { rows })
            }
            Err(err) => {
                warn!(error = %err, %format, "data load failed");
                let err = Arc::new(err);
                self.state = LoadState::Failed(Arc::clone(&err));
                Some(LoadEvent::Failed(err))
            }
        }
    }

    /// Forgets the last pair and returns to [`LoadState::Idle`].
    pub fn reset(&mut self) {
        self.last = None;
        self.state = LoadState::Idle;
    }
}

fn resolve(
    source: &DataSource,
    format: DataFormat,
    fetcher: &dyn Fetcher,
) -> Result<Dataset, DataError> {
    match source {
        DataSource::Rows(rows) => Ok(Dataset::Rows(rows.clone())),
        DataSource::Object(record) => Ok(Dataset::Object(record.clone())),
        DataSource::Url(url) => {
            debug!(url = %url, %format, "fetching data");
            let body = fetcher.fetch(url)?;
            parse_dataset(&body, format)
        }
        DataSource::Inline(value) => Err(DataError::UnsupportedValue(
            crate::record::kind_name(value).to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Record, StaticFetcher};
    use serde_json::json;

    fn fetcher() -> StaticFetcher {
        StaticFetcher::new()
            .with("/sales.csv", "date,foo\n2006,90\n2007,80\n")
            .with("/bad.json", "{oops")
    }

    #[test]
    fn loads_once_per_distinct_pair() {
        let f = fetcher();
        let mut loader = DataLoader::new();
        let src = DataSource::url("/sales.csv");
        let ev = loader.load(&src, DataFormat::Csv, &f, None);
        assert!(matches!(ev, Some(LoadEvent::Loaded { rows: 2 })));
        assert!(loader.load(&src, DataFormat::Csv, &f, None).is_none());
        let rows = loader.dataset().unwrap().rows().to_vec();
        assert_eq!(rows[0].get("date"), Some(&json!("2006")));
        assert_eq!(rows[1].number("foo"), Some(80.0));
    }

    #[test]
    fn format_change_reloads() {
        let f = fetcher();
        let mut loader = DataLoader::new();
        let src = DataSource::url("/sales.csv");
        loader.load(&src, DataFormat::Csv, &f, None);
        let ev = loader.load(&src, DataFormat::Tsv, &f, None);
        // One column named "date,foo" when split on tabs.
        assert!(matches!(ev, Some(LoadEvent::Loaded { rows: 2 })));
        let header: Vec<_> = loader.dataset().unwrap().rows()[0].fields().collect();
        assert_eq!(header, ["date,foo"]);
    }

    #[test]
    fn failures_are_a_distinct_state() {
        let f = fetcher();
        let mut loader = DataLoader::new();
        let ev = loader.load(&DataSource::url("/bad.json"), DataFormat::Json, &f, None);
        assert!(matches!(ev, Some(LoadEvent::Failed(_))));
        assert!(matches!(loader.state(), LoadState::Failed(_)));
        assert!(loader.error().is_some());
        assert!(loader.dataset().is_none());

        let ev = loader.load(&DataSource::Inline(json!(3)), DataFormat::Json, &f, None);
        assert!(matches!(
            ev,
            Some(LoadEvent::Failed(ref e)) if matches!(**e, DataError::UnsupportedValue(_))
        ));
    }

    #[test]
    fn hook_runs_before_loaded_and_can_fail() {
        let f = fetcher();
        let mut loader = DataLoader::new();
        let rows = vec![Record::new().with("v", 1), Record::new().with("v", 2)];
        let mut double = |d: &mut Dataset| -> Result<(), DataError> {
            for r in d.rows_mut() {
                let v = r.number("v").unwrap_or(0.0) * 2.0;
                r.insert("v", v);
            }
            Ok(())
        };
        loader.load(
            &DataSource::Rows(rows.clone()),
            DataFormat::Json,
            &f,
            Some(&mut double),
        );
        assert_eq!(loader.dataset().unwrap().rows()[1].number("v"), Some(4.0));

        let mut reject =
            |_: &mut Dataset| -> Result<(), DataError> { Err(DataError::Hook("no".into())) };
        let ev = loader.load(
            &DataSource::Rows(rows[..1].to_vec()),
            DataFormat::Json,
            &f,
            Some(&mut reject),
        );
        assert!(matches!(ev, Some(LoadEvent::Failed(_))));
        assert!(!loader.is_loaded());
    }
}
