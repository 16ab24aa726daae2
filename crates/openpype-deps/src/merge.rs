//! Deterministic merging of addon configurations into a base configuration
//!
//! Merge policy, applied per overlay:
//!
//! - `tool.poetry.dependencies` and `tool.poetry.dev-dependencies`: key-wise
//!   union, the overlay wins on a name collision. Addons are expected to pin
//!   tighter versions, so overrides are silent.
//! - Everything else: additive. Paths missing from the result are copied
//!   in; paths already present keep the base value. A differing leaf is a
//!   conflict. Under `<product>.thirdparty` the [`ConflictPolicy`] decides
//!   whether that is reported or fatal, and it is logged at `warn`. Other
//!   conflicts (addon package metadata) are logged at `debug`.
//!
//! Overlays fold left to right in the order given, so for a dependency
//! name defined by several addons the last one wins.

use crate::config::{ConfigSource, DependencySection, Document, ValidationProfile, join_path};
use crate::context::{ConflictPolicy, Context};
use crate::{Error, Result};
use toml::{Table, Value};

/// A path where the overlay disagreed with the base and the base was kept.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeConflict {
    pub path: String,
    pub base: Value,
    pub overlay: Value,
    /// The path lies inside the third-party block
    pub thirdparty: bool,
}

/// What one overlay changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeReport {
    /// Where the overlay came from
    pub location: Option<String>,
    /// Dependency entries the overlay added, as key paths
    pub added: Vec<String>,
    /// Dependency entries whose constraint the overlay replaced
    pub overridden: Vec<String>,
    /// Non-dependency paths where the base value was kept
    pub conflicts: Vec<MergeConflict>,
}

impl MergeReport {
    pub fn thirdparty_conflicts(&self) -> impl Iterator<Item = &MergeConflict> {
        self.conflicts.iter().filter(|c| c.thirdparty)
    }

    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.overridden.is_empty()
    }
}

/// Merge `overlay` into a copy of `base` using the default context.
///
/// Third-party conflicts keep the base value, so this cannot fail.
pub fn merge(base: &Document, overlay: &Document) -> Document {
    ConfigMerger::new(Context::default()).fold(base, overlay).0
}

/// Folds overlays into a base configuration.
#[derive(Debug, Clone)]
pub struct ConfigMerger {
    context: Context,
}

impl ConfigMerger {
    pub fn new(context: Context) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Merge `overlay` into a copy of `base`. Neither input is modified.
    pub fn merge(&self, base: &Document, overlay: &Document) -> Result<Document> {
        self.merge_with_report(base, overlay).map(|(document, _)| document)
    }

    /// Like [`merge`](Self::merge), also describing what changed.
    pub fn merge_with_report(
        &self,
        base: &Document,
        overlay: &Document,
    ) -> Result<(Document, MergeReport)> {
        let (result, report) = self.fold(base, overlay);
        if self.context.conflict_policy == ConflictPolicy::Reject {
            if let Some(conflict) = report.thirdparty_conflicts().next() {
                return Err(Error::ThirdpartyConflict {
                    path: conflict.path.clone(),
                    location: report.location.clone(),
                });
            }
        }
        Ok((result, report))
    }

    /// Base-wins fold of one overlay; conflicts are only recorded.
    fn fold(&self, base: &Document, overlay: &Document) -> (Document, MergeReport) {
        let mut result = base.clone();
        let mut report = MergeReport {
            location: overlay.origin().map(str::to_string),
            ..MergeReport::default()
        };

        for section in DependencySection::ALL {
            let Some(entries) = overlay.section(section) else {
                continue;
            };
            let section_path = section.path();
            if result.get_table(&section_path).is_none() {
                result.insert(&section_path, Value::Table(Table::new()));
            }
            for (name, spec) in entries {
                let key_path = format!("{}.{}", section.key_path(), name);
                let entry_path: Vec<&str> = section_path.iter().copied().chain([name.as_str()]).collect();
                match result.insert(&entry_path, spec.clone()) {
                    None => report.added.push(key_path),
                    Some(previous) if previous != *spec => {
                        tracing::debug!(path = %key_path, from = %previous, to = %spec, "dependency overridden");
                        report.overridden.push(key_path);
                    }
                    Some(_) => {}
                }
            }
        }

        let mut walker = AdditiveMerge {
            thirdparty: self.context.thirdparty_path(),
            location: overlay.origin(),
            path: Vec::new(),
            conflicts: Vec::new(),
        };
        walker.merge_tables(result.root_mut(), overlay.root());
        report.conflicts = walker.conflicts;

        (result, report)
    }

    /// Read, validate and fold each addon location in order.
    ///
    /// The first unreadable, malformed or invalid addon aborts the whole
    /// merge; no partially merged document is returned.
    pub fn merge_addons<S, L>(&self, base: &Document, locations: &[L], source: &S) -> Result<Document>
    where
        S: ConfigSource + ?Sized,
        L: AsRef<str>,
    {
        self.merge_addons_with_reports(base, locations, source)
            .map(|(document, _)| document)
    }

    pub fn merge_addons_with_reports<S, L>(
        &self,
        base: &Document,
        locations: &[L],
        source: &S,
    ) -> Result<(Document, Vec<MergeReport>)>
    where
        S: ConfigSource + ?Sized,
        L: AsRef<str>,
    {
        let validator = self.context.validator();
        let mut resolved = base.clone();
        let mut reports = Vec::with_capacity(locations.len());

        for location in locations {
            let location = location.as_ref();
            let addon = source.get_configuration(location)?;
            validator.validate(&addon, ValidationProfile::Addon)?;

            let (next, report) = self.merge_with_report(&resolved, &addon)?;
            tracing::debug!(
                location,
                added = report.added.len(),
                overridden = report.overridden.len(),
                conflicts = report.conflicts.len(),
                "merged addon"
            );
            resolved = next;
            reports.push(report);
        }

        Ok((resolved, reports))
    }
}

/// Recursive base-wins merge for everything outside the dependency tables.
struct AdditiveMerge<'a> {
    thirdparty: [&'a str; 2],
    location: Option<&'a str>,
    path: Vec<String>,
    conflicts: Vec<MergeConflict>,
}

impl AdditiveMerge<'_> {
    fn merge_tables(&mut self, target: &mut Table, overlay: &Table) {
        for (key, value) in overlay {
            self.path.push(key.clone());
            self.merge_entry(target, key, value);
            self.path.pop();
        }
    }

    fn merge_entry(&mut self, target: &mut Table, key: &str, value: &Value) {
        if value.is_table() && self.in_dependency_section() {
            return;
        }

        let Some(existing) = target.get_mut(key) else {
            target.insert(key.to_string(), value.clone());
            return;
        };

        match (existing, value) {
            (Value::Table(existing), Value::Table(overlay)) => self.merge_tables(existing, overlay),
            (existing, value) if *existing == *value => {}
            (existing, value) => self.conflict(existing.clone(), value.clone()),
        }
    }

    fn in_dependency_section(&self) -> bool {
        DependencySection::ALL
            .iter()
            .any(|section| self.path.iter().map(String::as_str).eq(section.path()))
    }

    fn conflict(&mut self, base: Value, overlay: Value) {
        let segments: Vec<&str> = self.path.iter().map(String::as_str).collect();
        let path = join_path(&segments);
        let thirdparty = segments.starts_with(&self.thirdparty);

        let location = self.location.unwrap_or("<memory>");
        if thirdparty {
            tracing::warn!(
                path = %path,
                base = %base,
                overlay = %overlay,
                location,
                "addon value ignored, base configuration wins"
            );
        } else {
            // package metadata such as `tool.poetry.name` differs in every addon
            tracing::debug!(path = %path, location, "addon value ignored, base configuration wins");
        }

        self.conflicts.push(MergeConflict {
            path,
            base,
            overlay,
            thirdparty,
        });
    }
}
