//! Build Service - the `update` and `dump` use cases.
//!
//! 1. Discover definition files below the plugin root
//! 2. Load them statically
//! 3. Resolve record inheritance and validate fields
//! 4. Regenerate the libs package (`update`)
//! 5. Encode one document per definition (`dump`)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::{
    application::{
        ApplicationError,
        ports::{DocumentEncoder, Filesystem},
    },
    domain::{
        DaemonDefinition, DefinitionKind, DefinitionUnit, DiscoveredFile, DomainError,
        DomainValidator, ModuleDefinition, RecordDefinition, RecordGraph,
        RelativePath, ScenarioDefinition, discover,
    },
    emit::{self, ScaffoldOptions},
    error::{BuilderError, BuilderResult},
    loader,
};

/// What a run produced, for reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub records: usize,
    pub scenarios: usize,
    pub daemons: usize,
    pub modules: usize,
    pub libs_files: usize,
    pub documents: Vec<PathBuf>,
}

/// Records and modules loaded by `update`, reused by `dump`.
struct Loaded {
    records: Vec<RecordDefinition>,
    modules: Vec<ModuleDefinition>,
    files: Vec<RelativePath>,
}

pub struct BuildService {
    filesystem: Box<dyn Filesystem>,
    encoder: Box<dyn DocumentEncoder>,
    options: ScaffoldOptions,
}

impl BuildService {
    pub fn new(
        filesystem: Box<dyn Filesystem>,
        encoder: Box<dyn DocumentEncoder>,
        options: ScaffoldOptions,
    ) -> Self {
        Self {
            filesystem,
            encoder,
            options,
        }
    }

    pub fn options(&self) -> &ScaffoldOptions {
        &self.options
    }

    /// Regenerates `<project>/<plugin_root>/<libs_dir>` from the records and
    /// modules of the project.
    #[instrument(skip_all, fields(project = %project.display()))]
    pub fn update(&self, project: &Path) -> BuilderResult<BuildReport> {
        let (report, _) = self.update_libs(project)?;
        Ok(report)
    }

    /// Runs [`update`](Self::update), then writes every document below
    /// `output`: records, scenarios, modules, daemons.
    #[instrument(skip_all, fields(project = %project.display(), output = %output.display()))]
    pub fn dump(&self, project: &Path, output: &Path) -> BuilderResult<BuildReport> {
        let (mut report, loaded) = self.update_libs(project)?;
        let root = self.plugin_root(project);

        let scenarios: Vec<ScenarioDefinition> = self.load_kind(
            &root,
            &loaded.files,
            DefinitionKind::Scenario,
            loader::load_scenario,
        )?;
        let daemons: Vec<DaemonDefinition> = self.load_kind(
            &root,
            &loaded.files,
            DefinitionKind::Daemon,
            loader::load_daemon,
        )?;
        report.scenarios = scenarios.len();
        report.daemons = daemons.len();

        let graph = RecordGraph::resolve(&loaded.records)?;
        for kind in DefinitionKind::ALL {
            let documents: Vec<(&DefinitionUnit, Value)> = match kind {
                DefinitionKind::Record => graph
                    .ordered()
                    .iter()
                    .copied()
                    .map(|r| Ok((&r.unit, emit::record_document(r)?)))
                    .collect::<Result<_, DomainError>>()?,
                DefinitionKind::Scenario => scenarios
                    .iter()
                    .map(|s| (&s.unit, emit::scenario_document(s)))
                    .collect(),
                DefinitionKind::Module => loaded
                    .modules
                    .iter()
                    .map(|m| (&m.unit, emit::module_document(m)))
                    .collect(),
                DefinitionKind::Daemon => daemons
                    .iter()
                    .map(|d| (&d.unit, emit::daemon_document(d)))
                    .collect(),
            };
            for (unit, document) in documents {
                report.documents.push(self.write_document(output, unit, &document)?);
            }
        }

        info!(documents = report.documents.len(), "Documents written");
        Ok(report)
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    fn plugin_root(&self, project: &Path) -> PathBuf {
        project.join(&self.options.plugin_root)
    }

    fn update_libs(&self, project: &Path) -> BuilderResult<(BuildReport, Loaded)> {
        let root = self.plugin_root(project);
        if !self.filesystem.is_dir(&root) {
            return Err(ApplicationError::ProjectNotFound { path: root }.into());
        }

        let files = self.filesystem.list_files(&root)?;
        debug!(files = files.len(), "Plugin root listed");
        let records = self.load_kind(&root, &files, DefinitionKind::Record, loader::load_record)?;
        let modules = self.load_kind(&root, &files, DefinitionKind::Module, loader::load_module)?;

        let graph = RecordGraph::resolve(&records)?;
        DomainValidator::validate_fields(&graph)?;
        let tree = emit::scaffold(&graph, &modules, &self.options)?;

        let libs = root.join(&self.options.libs_dir);
        self.filesystem.remove_dir_all(&libs)?;
        self.filesystem.create_dir_all(&libs)?;
        for file in tree.files() {
            let path = libs.join(file.path.as_path());
            debug!(path = %path.display(), "Creating");
            self.filesystem.write_file(&path, &file.content)?;
        }
        info!(
            records = records.len(),
            modules = modules.len(),
            files = tree.len(),
            "Libs updated"
        );

        let report = BuildReport {
            records: records.len(),
            modules: modules.len(),
            libs_files: tree.len(),
            ..BuildReport::default()
        };
        Ok((
            report,
            Loaded {
                records,
                modules,
                files,
            },
        ))
    }

    fn load_kind<T>(
        &self,
        root: &Path,
        files: &[RelativePath],
        kind: DefinitionKind,
        load: fn(&DiscoveredFile, &str) -> Result<T, DomainError>,
    ) -> BuilderResult<Vec<T>> {
        discover(files, kind)?
            .iter()
            .map(|file| {
                let text = self.filesystem.read_to_string(&root.join(file.path.as_path()))?;
                debug!(path = %file.path, %kind, "Loading");
                load(file, &text).map_err(BuilderError::from)
            })
            .collect()
    }

    fn write_document(
        &self,
        output: &Path,
        unit: &DefinitionUnit,
        document: &Value,
    ) -> BuilderResult<PathBuf> {
        let dir = output.join(&unit.workspace).join(unit.kind.dir_name());
        let path = dir.join(format!("{}.{}", unit.name, self.encoder.extension()));
        let text = self.encoder.encode(&unit.name, document)?;
        self.filesystem.create_dir_all(&dir)?;
        info!(path = %path.display(), "Creating");
        self.filesystem.write_file(&path, &text)?;
        Ok(path)
    }
}
