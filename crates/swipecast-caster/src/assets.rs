use swipecast_protocol::error::CastRuntimeResult;
use swipecast_protocol::item::{ContentItem, ContentKind};
use swipecast_protocol::mint::AssetUpload;
use swipecast_protocol::source::{MediaFetcher, ReelMediaResolver};

pub const DEFAULT_VIDEO_MIME: &str = "video/mp4";
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// The asset set handed to the uploader: a still image (poster for videos)
/// plus the playable media when the item is a reel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagedMedia {
    pub image: AssetUpload,
    pub animation: Option<AssetUpload>,
}

/// Resolves and downloads the media payload for one item.
///
/// Reels (items carrying a shortcode) go through the side lookup to find the
/// downloadable file; the thumbnail becomes the poster. Plain images download
/// once. Items with no media at all get a synthesized placeholder labeled
/// with the kind, so the mint can still proceed.
pub async fn package_media(
    item: &ContentItem,
    resolver: &dyn ReelMediaResolver,
    fetcher: &dyn MediaFetcher,
) -> CastRuntimeResult<PackagedMedia> {
    if let Some(code) = item.code.as_deref() {
        if let Some(video_url) = resolver.resolve_reel_media(code).await? {
            let video_bytes = fetcher.fetch_media(&video_url).await?;
            let video = AssetUpload {
                file_name: file_name_from_url(&video_url, "reel.mp4"),
                content_type: video_mime_for_url(&video_url).to_owned(),
                bytes: video_bytes,
            };
            let poster = match item.thumbnail_url.as_deref() {
                Some(url) => download_image(fetcher, url).await?,
                None => placeholder_image(item.kind),
            };
            return Ok(PackagedMedia {
                image: poster,
                animation: Some(video),
            });
        }
    }

    // Plain image, or a reel whose media could not be resolved.
    let image_url = item.thumbnail_url.as_deref().or(item.media_url.as_deref());
    let image = match image_url {
        Some(url) => download_image(fetcher, url).await?,
        None => placeholder_image(item.kind),
    };
    Ok(PackagedMedia {
        image,
        animation: None,
    })
}

async fn download_image(fetcher: &dyn MediaFetcher, url: &str) -> CastRuntimeResult<AssetUpload> {
    let bytes = fetcher.fetch_media(url).await?;
    Ok(AssetUpload {
        file_name: file_name_from_url(url, "image.jpg"),
        content_type: image_mime_for_url(url).to_owned(),
        bytes,
    })
}

pub fn placeholder_image(kind: ContentKind) -> AssetUpload {
    let label = kind.label();
    let svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"600\" height=\"600\">\
         <rect width=\"100%\" height=\"100%\" fill=\"#1a1a2e\"/>\
         <text x=\"50%\" y=\"50%\" fill=\"#e0e0e0\" font-family=\"sans-serif\" \
         font-size=\"48\" text-anchor=\"middle\" dominant-baseline=\"middle\">{label}</text>\
         </svg>"
    );
    AssetUpload {
        file_name: format!("{label}-placeholder.svg"),
        content_type: "image/svg+xml".to_owned(),
        bytes: svg.into_bytes(),
    }
}

pub fn video_mime_for_url(url: &str) -> &'static str {
    match url_extension(url).as_deref() {
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("webm") => "video/webm",
        _ => DEFAULT_VIDEO_MIME,
    }
}

pub fn image_mime_for_url(url: &str) -> &'static str {
    match url_extension(url).as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => DEFAULT_IMAGE_MIME,
    }
}

fn url_extension(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.rsplit('/').next()?;
    let (stem, extension) = segment.rsplit_once('.')?;
    if stem.is_empty() || extension.is_empty() {
        return None;
    }
    Some(extension.to_ascii_lowercase())
}

fn file_name_from_url(url: &str, fallback: &str) -> String {
    url.split(['?', '#'])
        .next()
        .and_then(|path| path.rsplit('/').next())
        .filter(|segment| !segment.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| fallback.to_owned())
}
