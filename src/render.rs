//! Score image rendering.
//!
//! The `render` command turns a score into an image through a [`Renderer`].
//! [`HttpRenderer`] posts the score to a render service and returns the image
//! it answers with.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use mime::Mime;
use mockall::automock;
use reqwest::{Client, header::CONTENT_TYPE};
use serde::Serialize;

use crate::{
    commands::reply::Image,
    servers::{Mode, Score},
};

/// Produces an image from a score.
#[automock]
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Renders `score`, played in `mode`.
    async fn render(&self, score: &Score, mode: Mode) -> Result<Image, anyhow::Error>;
}

/// Body sent to the render service.
#[derive(Serialize, Debug)]
struct RenderRequest<'a> {
    score_id: Option<&'a str>,
    beatmap_id: &'a str,
    mods: u32,
    mode: u8,
}

/// Client of an HTTP render service.
pub struct HttpRenderer {
    /// Render endpoint
    url: String,
    /// HTTP client
    client: Client,
}

impl HttpRenderer {
    /// Creates a new [`HttpRenderer`] posting to `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(url: &str, timeout: u64) -> Result<Self, anyhow::Error> {
        let client = Client::builder().timeout(Duration::from_secs(timeout)).build()?;

        Ok(HttpRenderer {
            url: url.to_owned(),
            client,
        })
    }
}

#[async_trait]
impl Renderer for HttpRenderer {
    /// Posts the score as JSON, the response body is the image.
    ///
    /// The image type comes from the `Content-Type` header, PNG when missing.
    async fn render(&self, score: &Score, mode: Mode) -> Result<Image, anyhow::Error> {
        let body = RenderRequest {
            score_id: score.score_id.as_deref(),
            beatmap_id: &score.beatmap_id,
            mods: score.mods.0,
            mode: mode.index(),
        };
        info!("request render of beatmap {}", score.beatmap_id);
        debug!("request {} -> {:?}", &self.url, &body);

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let mime = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<Mime>().ok())
            .unwrap_or(mime::IMAGE_PNG);
        let data = response.bytes().await?.to_vec();

        debug!("render of {} bytes ({})", data.len(), mime);

        Ok(Image { data, mime })
    }
}

#[cfg(test)]
mod tests {
    use mockito::{Matcher, Server};
    use serde_json::json;

    use super::*;
    use crate::servers::Mods;

    fn create_test_score() -> Score {
        Score {
            score_id: Some("987".to_owned()),
            beatmap_id: "75".to_owned(),
            title: "Kenji Ninuma - DISCOPRINCE [Normal]".to_owned(),
            mods: Mods(8),
            accuracy: 99.0,
            performance: Some(120.0),
            grade: "S".to_owned(),
            max_combo: 314,
        }
    }

    #[tokio::test]
    async fn test_render() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/render")
            .match_body(Matcher::Json(json!({
                "score_id": "987",
                "beatmap_id": "75",
                "mods": 8,
                "mode": 1
            })))
            .with_status(200)
            .with_header("content-type", "image/jpeg")
            .with_body([1u8, 2, 3])
            .create_async()
            .await;

        let renderer = HttpRenderer::new(&format!("{}/render", server.url()), 5).unwrap();
        let image = renderer.render(&create_test_score(), Mode::Taiko).await.unwrap();

        mock.assert_async().await;
        assert_eq!(image.data, vec![1, 2, 3]);
        assert_eq!(image.mime, mime::IMAGE_JPEG);
    }

    #[tokio::test]
    async fn test_render_error_status() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/render")
            .with_status(500)
            .create_async()
            .await;

        let renderer = HttpRenderer::new(&format!("{}/render", server.url()), 5).unwrap();

        assert!(renderer.render(&create_test_score(), Mode::Standard).await.is_err());
    }
}
