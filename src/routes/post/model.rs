use axum::extract::Multipart;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::AppError, infrastructure::ImageUpload, services::PostInput};

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct DeletePostResponse {
    pub message: String,
}

/// 路径中的帖子 ID 不是合法 UUID 时按帖子不存在处理
pub fn parse_post_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound("Post"))
}

/// 读取 `title`、`content` 和可选的 `image` 表单字段，忽略其他字段
pub async fn read_post_form(mut multipart: Multipart) -> Result<PostInput, AppError> {
    let mut input = PostInput::default();

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("title") => input.title = Some(field.text().await?),
            Some("content") => input.content = Some(field.text().await?),
            Some("image") => {
                let file_name = field.file_name().map(str::to_string);
                let data = field.bytes().await?;
                // 浏览器在未选择文件时仍会提交空的 image 字段
                if let Some(file_name) = file_name.filter(|name| !name.is_empty()) {
                    if !data.is_empty() {
                        input.image = Some(ImageUpload { file_name, data });
                    }
                }
            }
            _ => {}
        }
    }

    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("not-a-uuid")]
    #[case("")]
    #[case("123")]
    fn malformed_post_id_is_not_found(#[case] raw: &str) {
        assert!(matches!(parse_post_id(raw), Err(AppError::NotFound("Post"))));
    }

    #[test]
    fn valid_post_id_parses() {
        let id = Uuid::new_v4();
        assert_eq!(parse_post_id(&id.to_string()).unwrap(), id);
    }
}
