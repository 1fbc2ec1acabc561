//! Resolves a batch of targets and validates their shared build environments.

use std::collections::BTreeSet;

use compact_str::CompactString;
use derivative::Derivative;
use rayon::prelude::*;
use tr_cfg::Schema;
use tr_types::ModuleGraph;

use crate::args::CommandLine;
use crate::config_file::ConfigFiles;
use crate::environment::{self, EnvironmentGroup};
use crate::options::{BUILD_ENVIRONMENT, LINK_TYPE, OVERRIDE_BUILD_ENVIRONMENT};
use crate::platform::PlatformRegistry;
use crate::resolver::{Resolver, TargetRequest};
use crate::rules::RulesRegistry;
use crate::snapshot::Snapshot;
use crate::validate::GroupReport;
use crate::{Error, PlanErrors};

/// Configuration for creating an [`Engine`].
pub struct EngineConfig {
    /// Every option a target can have.
    pub schema: Schema,
    /// Platforms we know how to build for.
    pub platforms: PlatformRegistry,
    /// Named target rules, referenced by [`tr_types::TargetIdentity::rules`].
    pub rules: RulesRegistry,
    /// Layered config files.
    pub config_files: ConfigFiles,
    /// Modules of the project, used by a few derived defaults.
    pub modules: ModuleGraph,
    /// Arguments that apply to every target.
    pub command_line: CommandLine,
    /// Number of threads used to resolve targets.
    pub workers: usize,
}

#[derive(Derivative)]
#[derivative(Debug)]
pub struct Engine {
    schema: Schema,
    platforms: PlatformRegistry,
    rules: RulesRegistry,
    config_files: ConfigFiles,
    modules: ModuleGraph,
    command_line: CommandLine,

    /// Pool that targets get resolved on.
    #[derivative(Debug = "ignore")]
    pool: rayon::ThreadPool,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self, anyhow::Error> {
        let EngineConfig {
            schema,
            platforms,
            rules,
            config_files,
            modules,
            command_line,
            workers,
        } = config;

        // Grouping and validation read these, every schema needs them.
        for required in [
            LINK_TYPE.name(),
            BUILD_ENVIRONMENT.name(),
            OVERRIDE_BUILD_ENVIRONMENT.name(),
        ] {
            if !schema.contains(required) {
                anyhow::bail!("schema is missing required option '{required}'");
            }
        }
        if platforms.is_empty() {
            anyhow::bail!("no platforms registered");
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|idx| format!("tr-resolve-{idx}"))
            .build()?;
        tracing::info!(
            options = schema.len(),
            rules = ?rules.names().collect::<Vec<_>>(),
            workers,
            "created engine"
        );

        Ok(Engine {
            schema,
            platforms,
            rules,
            config_files,
            modules,
            command_line,
            pool,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    fn resolver(&self) -> Resolver<'_> {
        Resolver {
            schema: &self.schema,
            platforms: &self.platforms,
            rules: &self.rules,
            config: &self.config_files,
            modules: &self.modules,
            command_line: &self.command_line,
        }
    }

    /// Resolve a single target, without any validation against other targets.
    pub fn resolve(&self, request: &TargetRequest) -> Result<Snapshot, Error> {
        self.resolver().resolve(request)
    }

    /// Resolve every target in `requests` and validate the environments they share.
    ///
    /// Resolution continues past failing targets so that one run reports every problem.
    pub fn resolve_all(&self, requests: Vec<TargetRequest>) -> BuildPlan {
        let mut errors = Vec::new();

        let mut seen = BTreeSet::new();
        let mut unique = Vec::with_capacity(requests.len());
        for request in requests {
            let name = CompactString::new(request.identity.name());
            if seen.insert(name.clone()) {
                unique.push(request);
            } else {
                errors.push(Error::DuplicateTarget { target: name });
            }
        }

        let resolver = self.resolver();
        let results: Vec<Result<Snapshot, Error>> = self
            .pool
            .install(|| unique.par_iter().map(|request| resolver.resolve(request)).collect());

        let mut snapshots = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(err) => {
                    tracing::warn!(target_name = err.target(), "failed to resolve: {err}");
                    errors.push(err);
                }
            }
        }

        let reports: Vec<GroupReport> = environment::group(&snapshots)
            .into_iter()
            .map(GroupReport::check)
            .collect();
        errors.extend(reports.iter().filter_map(GroupReport::to_error));

        tracing::info!(
            targets = snapshots.len(),
            environments = reports.len(),
            errors = errors.len(),
            "resolved build plan"
        );

        BuildPlan {
            snapshots,
            reports,
            errors,
        }
    }
}

/// Result of resolving a batch of targets.
#[derive(Debug)]
pub struct BuildPlan {
    /// Successfully resolved targets, in request order.
    pub snapshots: Vec<Snapshot>,
    /// One report per build environment.
    pub reports: Vec<GroupReport>,
    pub errors: Vec<Error>,
}

impl BuildPlan {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn groups(&self) -> impl Iterator<Item = &EnvironmentGroup> {
        self.reports.iter().map(|report| &report.group)
    }

    /// Returns the snapshots if no target failed and no environment conflicted.
    pub fn into_result(self) -> Result<Vec<Snapshot>, PlanErrors> {
        if self.errors.is_empty() {
            Ok(self.snapshots)
        } else {
            Err(PlanErrors::new(self.errors))
        }
    }
}
