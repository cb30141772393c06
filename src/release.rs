use log::info;

use crate::{
    changelog::Changelog,
    config::ReleaseConfig,
    error::Result,
    git::ReleasePackage,
    process::{CommandRunner, Stdio, SystemRunner},
    test_runner::TestRunner,
};

/// Gates each package on its tests, then writes and commits its changelog.
///
/// Packages are handled one at a time, in the order given, so that commits
/// never race on a shared index. The first failure stops the release.
///
/// # Example
///
/// ```no_run
/// # use northbrook::{Release, ReleaseConfig, Stdio};
/// # let packages = vec![];
/// let cfg = ReleaseConfig::from_dir(".").unwrap();
/// let released = Release::new(cfg).run(packages, &mut Stdio::default()).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Release<R = SystemRunner> {
    config: ReleaseConfig,
    runner: R,
}

impl Release {
    pub fn new(config: ReleaseConfig) -> Self {
        Release {
            config,
            runner: SystemRunner,
        }
    }
}

impl<R: CommandRunner> Release<R> {
    pub fn with_runner<T: CommandRunner>(self, runner: T) -> Release<T> {
        Release {
            config: self.config,
            runner,
        }
    }

    pub fn config(&self) -> &ReleaseConfig { &self.config }

    pub fn run(&self, packages: Vec<ReleasePackage>, io: &mut Stdio) -> Result<Vec<ReleasePackage>> {
        let changelog = Changelog::from_config(&self.config).with_runner(&self.runner);

        let mut released = Vec::with_capacity(packages.len());
        for package in packages {
            let package = TestRunner::from_config(&package.directory, &self.config)
                .with_runner(&self.runner)
                .run(package, io)?;
            changelog.generate(&package, io)?;
            info!("{} {} is ready", package.pkg.name, package.pkg.version);
            released.push(package);
        }

        Ok(released)
    }
}
