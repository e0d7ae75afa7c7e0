use super::derivative_link::{DerivativeLink, Repository};
use super::link_owner::{LinkOwner, Task, Version};
use crate::config::StorageSettings;
use crate::error::MediaResult;
use crate::tools::{
    dotted_extension, ensure_directory_exists, move_file, remove_file_quietly, upload_file,
};
use log::{debug, info, warn};
use std::io::Read;
use std::path::{Path, PathBuf};

pub const WEB_VERSION_FOLDER: &str = "ForWeb";
pub const THUMBNAIL_FOLDER: &str = "Thumbnail";

/// 產生衍生檔案的來源，回傳暫存檔路徑
pub trait DerivativeSource {
    fn generate_media_for_web(&self, path: &Path) -> MediaResult<PathBuf>;
    fn generate_thumbnail(&self, path: &Path) -> MediaResult<PathBuf>;
}

/// 已產生的衍生檔案暫存路徑，失敗的階段為 `None`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivativeFiles {
    pub web_version: Option<PathBuf>,
    pub thumbnail: Option<PathBuf>,
}

impl DerivativeFiles {
    /// 分別產生網頁版本與縮圖
    ///
    /// 衍生檔案沒有產生時只記錄警告；中斷或工具無法執行等錯誤直接回傳，
    /// 並刪除已產生的暫存檔。
    pub fn generate(source: &dyn DerivativeSource, original_path: &Path) -> MediaResult<Self> {
        let web_version = absorb_missing(
            source.generate_media_for_web(original_path),
            "網頁版本",
            original_path,
        )?;

        let thumbnail = match absorb_missing(
            source.generate_thumbnail(original_path),
            "縮圖",
            original_path,
        ) {
            Ok(thumbnail) => thumbnail,
            Err(e) => {
                if let Some(web_version) = &web_version {
                    remove_file_quietly(web_version);
                }
                return Err(e);
            }
        };

        Ok(Self {
            web_version,
            thumbnail,
        })
    }

    /// 刪除尚未搬移的暫存檔
    fn discard(&self) {
        for path in [&self.web_version, &self.thumbnail].into_iter().flatten() {
            remove_file_quietly(path);
        }
    }
}

fn absorb_missing(
    result: MediaResult<PathBuf>,
    stage: &str,
    original_path: &Path,
) -> MediaResult<Option<PathBuf>> {
    match result {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.is_missing_derivative() => {
            warn!("無法產生{stage} {}: {e}", original_path.display());
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

pub struct ArtifactLinker {
    repository: Repository,
    storage: StorageSettings,
}

impl ArtifactLinker {
    #[must_use]
    pub fn new(repository: Repository, storage: StorageSettings) -> Self {
        Self {
            repository,
            storage,
        }
    }

    #[must_use]
    pub const fn repository(&self) -> &Repository {
        &self.repository
    }

    /// 上傳任務參考檔並建立衍生檔案連結
    pub fn upload_reference(
        &self,
        source: &dyn DerivativeSource,
        task: &mut Task,
        reader: &mut impl Read,
        filename: Option<&str>,
    ) -> MediaResult<DerivativeLink> {
        let directory = task.absolute_path.join(&self.storage.reference_path);
        self.upload_and_attach(source, task, &directory, reader, filename)
    }

    /// 上傳版本輸出檔並建立衍生檔案連結
    pub fn upload_version_output(
        &self,
        source: &dyn DerivativeSource,
        version: &mut Version,
        reader: &mut impl Read,
        filename: Option<&str>,
    ) -> MediaResult<DerivativeLink> {
        let directory = version.absolute_path.join(&self.storage.version_output_path);
        self.upload_and_attach(source, version, &directory, reader, filename)
    }

    fn upload_and_attach(
        &self,
        source: &dyn DerivativeSource,
        owner: &mut dyn LinkOwner,
        directory: &Path,
        reader: &mut impl Read,
        filename: Option<&str>,
    ) -> MediaResult<DerivativeLink> {
        let original_path = upload_file(reader, directory, filename)?;
        let original_filename = filename.map_or_else(
            || file_name_of(&original_path),
            std::string::ToString::to_string,
        );

        let derivatives = DerivativeFiles::generate(source, &original_path)?;
        let link = self.link_derivatives(&original_path, &original_filename, derivatives)?;

        debug!(
            "連結已加入 {}: {}",
            owner.absolute_path().display(),
            link.full_path
        );
        owner.attach(link.clone());
        Ok(link)
    }

    /// 將衍生檔案搬到原始檔旁的 `ForWeb/`、`Thumbnail/`，並建立連結鏈
    ///
    /// 只有縮圖而沒有網頁版本時，縮圖仍會搬移但不加入連結鏈。
    pub fn link_derivatives(
        &self,
        original_path: &Path,
        original_filename: &str,
        derivatives: DerivativeFiles,
    ) -> MediaResult<DerivativeLink> {
        let mut root = DerivativeLink::new(
            self.repository.make_relative(original_path),
            original_filename,
        );

        let web_path = match &derivatives.web_version {
            Some(temp) => match self.place_derivative(temp, original_path, WEB_VERSION_FOLDER) {
                Ok(path) => Some(path),
                Err(e) => {
                    derivatives.discard();
                    return Err(e);
                }
            },
            None => None,
        };

        let thumbnail_path = match &derivatives.thumbnail {
            Some(temp) => match self.place_derivative(temp, original_path, THUMBNAIL_FOLDER) {
                Ok(path) => Some(path),
                Err(e) => {
                    derivatives.discard();
                    if let Some(web_path) = &web_path {
                        remove_file_quietly(web_path);
                    }
                    return Err(e);
                }
            },
            None => None,
        };

        let web_link = web_path.map(|path| self.link_for(&path, original_filename));
        let thumbnail_link = thumbnail_path.map(|path| self.link_for(&path, original_filename));

        match (web_link, thumbnail_link) {
            (Some(mut web), thumbnail) => {
                if let Some(thumbnail) = thumbnail {
                    web.set_thumbnail(thumbnail);
                }
                root.set_thumbnail(web);
            }
            (None, Some(thumbnail)) => {
                warn!("缺少網頁版本，縮圖未加入連結: {}", thumbnail.full_path);
            }
            (None, None) => {}
        }

        info!(
            "連結鏈已建立: {} (深度 {})",
            root.full_path,
            root.chain_depth()
        );
        Ok(root)
    }

    /// 搬移到 `<原始檔資料夾>/<folder>/<原始主檔名><衍生副檔名>`
    fn place_derivative(
        &self,
        temp_path: &Path,
        original_path: &Path,
        folder: &str,
    ) -> MediaResult<PathBuf> {
        let directory = original_path
            .parent()
            .unwrap_or(Path::new(""))
            .join(folder);
        ensure_directory_exists(&directory)?;

        let base_name = original_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let destination = directory.join(format!("{base_name}{}", dotted_extension(temp_path)));

        move_file(temp_path, &destination)?;
        debug!("{} -> {}", temp_path.display(), destination.display());
        Ok(destination)
    }

    fn link_for(&self, path: &Path, original_filename: &str) -> DerivativeLink {
        DerivativeLink::new(self.repository.make_relative(path), original_filename)
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().to_string())
        .unwrap_or_default()
}
