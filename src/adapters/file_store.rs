use crate::adapters::memory_store::Tables;
use crate::domain::model::{
    CodeArtifact, Deployment, DeploymentId, Domain, DomainId, Project, ProjectId, UserId,
};
use crate::domain::ports::RecordStore;
use crate::utils::error::StoreError;
use async_trait::async_trait;
use fs2::FileExt;
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Record store persisted as one JSON document.
///
/// Nothing is cached between calls. Every operation takes a lock on a sibling
/// `<file>.lock` (shared for queries, exclusive for mutations) and reads the
/// document from disk, so several processes can share one file. Mutations
/// write a fresh temp file in the same directory and rename it over the
/// document before the lock is released.
pub struct JsonFileRecordStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl JsonFileRecordStore {
    /// Opens `path`, starting empty when the file does not exist yet. A file
    /// that is not a valid store document is rejected here.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let store = Self {
            lock_path: lock_path_for(&path),
            path,
        };
        let projects = store.read(|t| t.projects.len()).await?;
        tracing::debug!("Opened record store {} ({} projects)", store.path.display(), projects);
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn mutate<T, F>(&self, apply: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Tables) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let path = self.path.clone();
        let lock_path = self.lock_path.clone();
        run_blocking(move || {
            let lock = open_lock(&lock_path)?;
            FileExt::lock_exclusive(&lock)?;
            let mut tables = load(&path)?;
            let out = apply(&mut tables)?;
            persist(&path, &tables)?;
            FileExt::unlock(&lock)?;
            Ok(out)
        })
        .await
    }

    async fn read<T, F>(&self, query: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Tables) -> T + Send + 'static,
        T: Send + 'static,
    {
        let path = self.path.clone();
        let lock_path = self.lock_path.clone();
        run_blocking(move || {
            let lock = open_lock(&lock_path)?;
            FileExt::lock_shared(&lock)?;
            let tables = load(&path)?;
            FileExt::unlock(&lock)?;
            Ok(query(&tables))
        })
        .await
    }
}

async fn run_blocking<T, F>(job: F) -> Result<T, StoreError>
where
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| StoreError::Io(std::io::Error::other(e)))?
}

fn lock_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("records"));
    name.push(".lock");
    path.with_file_name(name)
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn open_lock(lock_path: &Path) -> Result<File, StoreError> {
    std::fs::create_dir_all(parent_dir(lock_path))?;
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path)?;
    Ok(file)
}

fn load(path: &Path) -> Result<Tables, StoreError> {
    match std::fs::read(path) {
        Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Tables::default()),
        Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
            message: format!("{}: {}", path.display(), e),
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Tables::default()),
        Err(e) => Err(StoreError::Io(e)),
    }
}

fn persist(path: &Path, tables: &Tables) -> Result<(), StoreError> {
    let data = serde_json::to_vec_pretty(tables)?;
    let mut tmp = NamedTempFile::new_in(parent_dir(path))?;
    tmp.write_all(&data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
    tracing::trace!("Wrote record store ({} bytes)", data.len());
    Ok(())
}

#[async_trait]
impl RecordStore for JsonFileRecordStore {
    async fn insert_project(&self, project: &Project) -> Result<(), StoreError> {
        let project = project.clone();
        self.mutate(move |t| t.insert_project(&project)).await
    }

    async fn update_project(&self, project: &Project) -> Result<(), StoreError> {
        let project = project.clone();
        self.mutate(move |t| {
            t.update_project(&project);
            Ok(())
        })
        .await
    }

    async fn get_project(&self, id: ProjectId) -> Result<Option<Project>, StoreError> {
        self.read(move |t| t.get_project(id)).await
    }

    async fn list_projects(&self, user_id: UserId) -> Result<Vec<Project>, StoreError> {
        self.read(move |t| t.list_projects(user_id)).await
    }

    async fn delete_project(&self, id: ProjectId) -> Result<(), StoreError> {
        self.mutate(move |t| {
            t.delete_project(id);
            Ok(())
        })
        .await
    }

    async fn insert_artifact(&self, artifact: &CodeArtifact) -> Result<(), StoreError> {
        let artifact = artifact.clone();
        self.mutate(move |t| {
            t.insert_artifact(&artifact);
            Ok(())
        })
        .await
    }

    async fn latest_artifact(
        &self,
        project_id: ProjectId,
    ) -> Result<Option<CodeArtifact>, StoreError> {
        self.read(move |t| t.latest_artifact(project_id)).await
    }

    async fn insert_deployment(&self, deployment: &Deployment) -> Result<(), StoreError> {
        let deployment = deployment.clone();
        self.mutate(move |t| t.insert_deployment(&deployment)).await
    }

    async fn update_deployment(&self, deployment: &Deployment) -> Result<(), StoreError> {
        let deployment = deployment.clone();
        self.mutate(move |t| {
            t.update_deployment(&deployment);
            Ok(())
        })
        .await
    }

    async fn get_deployment(&self, id: DeploymentId) -> Result<Option<Deployment>, StoreError> {
        self.read(move |t| t.get_deployment(id)).await
    }

    async fn list_deployments(&self, project_id: ProjectId) -> Result<Vec<Deployment>, StoreError> {
        self.read(move |t| t.list_deployments(project_id)).await
    }

    async fn live_deployment(
        &self,
        project_id: ProjectId,
    ) -> Result<Option<Deployment>, StoreError> {
        self.read(move |t| t.live_deployment(project_id)).await
    }

    async fn insert_domain(&self, domain: &Domain) -> Result<(), StoreError> {
        let domain = domain.clone();
        self.mutate(move |t| t.insert_domain(&domain)).await
    }

    async fn update_domain(&self, domain: &Domain) -> Result<(), StoreError> {
        let domain = domain.clone();
        self.mutate(move |t| {
            t.update_domain(&domain);
            Ok(())
        })
        .await
    }

    async fn get_domain(&self, id: DomainId) -> Result<Option<Domain>, StoreError> {
        self.read(move |t| t.get_domain(id)).await
    }

    async fn find_domain_by_name(&self, name: &str) -> Result<Option<Domain>, StoreError> {
        let name = name.to_string();
        self.read(move |t| t.find_domain_by_name(&name)).await
    }

    async fn list_domains(&self, project_id: ProjectId) -> Result<Vec<Domain>, StoreError> {
        self.read(move |t| t.list_domains(project_id)).await
    }

    async fn delete_domain(&self, id: DomainId) -> Result<bool, StoreError> {
        self.mutate(move |t| Ok(t.delete_domain(id))).await
    }
}
