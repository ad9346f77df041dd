//! Autoremover - 더 이상 필요 없는 의존성 플러그인 제거
//!
//! 로드된 플러그인 전체를 반복해서 다시 계산합니다.
//! 한 번의 패스에서 아무것도 제거되지 않으면 종료합니다.

use super::identifier::{ArtifactIdentifier, ManifestIdentifier};
use super::registration::{LoadedPlugin, PluginKind};
use super::traits::PluginRegistry;
use plinth_foundation::{Error, Result};
use std::collections::HashMap;
use tracing::{debug, info};

/// 자동 제거 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoremoveOutcome {
    /// 제거할 플러그인 없음
    NothingToDo,

    /// 제거 순서대로
    Removed(Vec<ManifestIdentifier>),
}

impl AutoremoveOutcome {
    pub fn removed(&self) -> &[ManifestIdentifier] {
        match self {
            AutoremoveOutcome::NothingToDo => &[],
            AutoremoveOutcome::Removed(removed) => removed,
        }
    }
}

pub struct Autoremover<'a> {
    registry: &'a dyn PluginRegistry,
}

impl<'a> Autoremover<'a> {
    pub fn new(registry: &'a dyn PluginRegistry) -> Self {
        Self { registry }
    }

    /// 고정점에 도달할 때까지 제거
    pub async fn run(&self) -> Result<AutoremoveOutcome> {
        let mut removed: Vec<ManifestIdentifier> = Vec::new();

        loop {
            let pass = self.pass(&removed).await?;
            if pass.is_empty() {
                break;
            }
            removed.extend(pass);
        }

        if removed.is_empty() {
            debug!("Autoremove: nothing to do");
            return Ok(AutoremoveOutcome::NothingToDo);
        }

        info!("Autoremoved {} plugin(s)", removed.len());
        Ok(AutoremoveOutcome::Removed(removed))
    }

    /// 한 번의 패스 (실제로 제거된 것만 반환)
    async fn pass(&self, already_removed: &[ManifestIdentifier]) -> Result<Vec<ManifestIdentifier>> {
        let loaded = self.registry.loaded_plugins().await?;
        let mut installed: HashMap<ArtifactIdentifier, bool> = HashMap::new();

        let mut removable = Vec::new();
        for plugin in &loaded {
            let manifest = plugin.manifest();
            if already_removed.contains(&manifest) {
                continue;
            }

            if self.is_removable(plugin, &mut installed).await? {
                removable.push(plugin);
            }
        }

        let mut removed = Vec::new();
        for plugin in removable {
            let manifest = plugin.manifest();
            info!("Uninstalling unneeded plugin {}", plugin.identifier());

            self.registry
                .set_enabled(&manifest, false)
                .await
                .map_err(|e| {
                    Error::Lifecycle(format!("Failed to disable {}: {}", plugin.identifier(), e))
                })?;

            if self.registry.uninstall(&plugin.registration).await? {
                removed.push(manifest);
            } else {
                debug!("Registry kept {} installed", plugin.identifier());
            }
        }

        Ok(removed)
    }

    async fn is_removable(
        &self,
        plugin: &LoadedPlugin,
        installed: &mut HashMap<ArtifactIdentifier, bool>,
    ) -> Result<bool> {
        if plugin.registration.required || plugin.kind != PluginKind::Dependency {
            return Ok(false);
        }

        for edge in plugin.artifact_dependers.iter().filter(|edge| edge.required) {
            if self.is_installed(&edge.parent, installed).await? {
                debug!("{} is required by artifact {}", plugin.identifier(), edge.parent);
                return Ok(false);
            }
        }

        for depender in plugin.dependers.iter().filter(|depender| depender.requires) {
            if self.is_installed(&depender.identifier, installed).await? {
                debug!("{} is required by plugin {}", plugin.identifier(), depender.identifier);
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// 패스 단위로 메모이즈된 설치 여부
    async fn is_installed(
        &self,
        identifier: &ArtifactIdentifier,
        installed: &mut HashMap<ArtifactIdentifier, bool>,
    ) -> Result<bool> {
        if let Some(cached) = installed.get(identifier) {
            return Ok(*cached);
        }

        let result = self.registry.is_installed(identifier).await?;
        installed.insert(identifier.clone(), result);
        Ok(result)
    }
}
