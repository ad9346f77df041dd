//! Dependency Installer - 전이적 의존성 설치
//!
//! 루트 아티팩트의 의존성 엣지를 깊이 우선으로 설치합니다.
//! 하위 의존성이 먼저 설치되고, 이미 설치된 매니페스트는 다시 내려가지 않습니다.
//!
//! 실패 정책:
//! - required 엣지: 부모/자식 정보를 붙여 전체 설치 중단
//! - optional 엣지: 경고 로그 후 계속 (보고서에 기록)
//! - 설치 직후 자동 시작 표시 실패도 같은 정책 (설치 자체는 유지)
//! - 순환: 항상 `DependencyCycle`

use super::artifact::ArtifactDependency;
use super::identifier::{ArtifactIdentifier, ManifestIdentifier};
use super::traits::PluginRegistry;
use futures::future::BoxFuture;
use plinth_foundation::{Error, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

// ============================================================================
// InstallReport
// ============================================================================

/// 건너뛴 optional 의존성
#[derive(Debug, Clone, Serialize)]
pub struct SkippedDependency {
    pub dependency: ArtifactDependency,
    pub reason: String,
}

/// 설치 결과
#[derive(Debug, Clone, Default, Serialize)]
pub struct InstallReport {
    /// 설치 순서대로
    pub installed: Vec<ArtifactIdentifier>,

    pub skipped: Vec<SkippedDependency>,
}

impl InstallReport {
    pub fn is_empty(&self) -> bool {
        self.installed.is_empty() && self.skipped.is_empty()
    }
}

// ============================================================================
// DependencyInstaller
// ============================================================================

/// 한 번의 설치 호출 동안만 유지되는 설치기
pub struct DependencyInstaller<'a> {
    registry: &'a dyn PluginRegistry,
    auto_start: bool,

    /// 현재 내려가고 있는 매니페스트 체인
    in_progress: Vec<ManifestIdentifier>,

    report: InstallReport,
}

impl<'a> DependencyInstaller<'a> {
    pub fn new(registry: &'a dyn PluginRegistry) -> Self {
        Self {
            registry,
            auto_start: true,
            in_progress: Vec::new(),
            report: InstallReport::default(),
        }
    }

    /// 설치된 의존성을 자동 시작으로 표시할지 (기본값 true)
    pub fn auto_start(mut self, auto_start: bool) -> Self {
        self.auto_start = auto_start;
        self
    }

    /// 엣지 순서대로 전이적 폐포 설치
    pub async fn install_closure(mut self, dependencies: &[ArtifactDependency]) -> Result<InstallReport> {
        for dependency in dependencies {
            let parent = dependency.parent.without_version();
            if !self.in_progress.contains(&parent) {
                self.in_progress.push(parent);
            }
        }

        self.install_edges(dependencies.to_vec()).await?;

        debug!(
            "Dependency closure done: {} installed, {} skipped",
            self.report.installed.len(),
            self.report.skipped.len()
        );
        Ok(self.report)
    }

    fn install_edges(&mut self, dependencies: Vec<ArtifactDependency>) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            for dependency in dependencies {
                if dependency.is_provided() {
                    debug!("Skipping provided dependency {}", dependency.child);
                    continue;
                }

                if self.registry.is_installed(&dependency.child).await? {
                    debug!("Dependency {} already installed", dependency.child.without_version());
                    continue;
                }

                let manifest = dependency.child.without_version();
                if self.in_progress.contains(&manifest) {
                    return Err(Error::DependencyCycle(self.cycle_chain(&manifest)));
                }

                self.in_progress.push(manifest);
                let subtree = self.install_subtree(&dependency.child).await;
                self.in_progress.pop();

                if let Err(e) = subtree {
                    self.fail(&dependency, e)?;
                }

                info!("Installing dependency {}", dependency.child);
                match self.registry.install(&dependency.child).await {
                    Ok(registration) => {
                        let manifest = registration.manifest();
                        self.report.installed.push(registration.identifier);

                        if self.auto_start {
                            if let Err(e) = self.registry.set_auto_start(&manifest, true).await {
                                self.fail(&dependency, e)?;
                            }
                        }
                    }
                    Err(e) => self.fail(&dependency, e)?,
                }
            }

            Ok(())
        })
    }

    async fn install_subtree(&mut self, child: &ArtifactIdentifier) -> Result<()> {
        let children = self.registry.dependencies(child).await?;
        self.install_edges(children).await
    }

    /// required/optional 정책 적용
    fn fail(&mut self, dependency: &ArtifactDependency, error: Error) -> Result<()> {
        if matches!(error, Error::DependencyCycle(_)) {
            return Err(error);
        }

        if dependency.required || !error.is_optional_downgradable() {
            return Err(Error::dependency_load(&dependency.child, &dependency.parent, error));
        }

        warn!(
            "Failed to install optional dependency {} for {}: {}",
            dependency.child, dependency.parent, error
        );
        self.report.skipped.push(SkippedDependency {
            dependency: dependency.clone(),
            reason: error.to_string(),
        });
        Ok(())
    }

    fn cycle_chain(&self, manifest: &ManifestIdentifier) -> String {
        let start = self
            .in_progress
            .iter()
            .position(|entry| entry == manifest)
            .unwrap_or(0);

        self.in_progress[start..]
            .iter()
            .chain(std::iter::once(manifest))
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}
