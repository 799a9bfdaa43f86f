use std::path::{Path, PathBuf};

use async_trait::async_trait;
use axum::body::Bytes;
use chrono::Utc;

/// 上传文件的公开访问前缀
pub const UPLOADS_ROUTE: &str = "/uploads";

/// 随请求提交的图片
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub data: Bytes,
}

/// 文件存储
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// 保存上传内容，返回可公开访问的引用路径
    async fn store(&self, upload: ImageUpload) -> std::io::Result<String>;
}

/// 本地磁盘存储，文件名为 `{毫秒时间戳}-{原始文件名}`
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    dir: PathBuf,
}

impl LocalFileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// 只保留客户端文件名的最后一段，避免写出目标目录
fn sanitize_file_name(original: &str) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    match base {
        "" | "." | ".." => "upload".to_string(),
        name => name.to_string(),
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn store(&self, upload: ImageUpload) -> std::io::Result<String> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let file_name = format!(
            "{}-{}",
            Utc::now().timestamp_millis(),
            sanitize_file_name(&upload.file_name)
        );
        tokio::fs::write(self.dir.join(&file_name), &upload.data).await?;
        tracing::debug!("Stored upload {} ({} bytes)", file_name, upload.data.len());

        Ok(format!("{}/{}", UPLOADS_ROUTE, file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("cat.png", "cat.png")]
    #[case("../../etc/passwd", "passwd")]
    #[case("C:\\photos\\dog.jpg", "dog.jpg")]
    #[case("..", "upload")]
    #[case("dir/", "upload")]
    fn keeps_only_base_name(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sanitize_file_name(input), expected);
    }

    #[tokio::test]
    async fn stores_file_under_upload_dir() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path().join("uploads"));

        let path = storage
            .store(ImageUpload {
                file_name: "photo.png".into(),
                data: Bytes::from_static(b"png-bytes"),
            })
            .await
            .unwrap();

        assert!(path.starts_with("/uploads/"));
        assert!(path.ends_with("-photo.png"));

        let stored_name = path.trim_start_matches("/uploads/");
        let contents = tokio::fs::read(storage.dir().join(stored_name)).await.unwrap();
        assert_eq!(contents, b"png-bytes");
    }
}
