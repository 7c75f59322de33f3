#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use image::{DynamicImage, ImageFormat, RgbImage};
use lopdf::{Dictionary, Document, Object, dictionary};
use metadata_extractor::config::ExtractorConfig;
use metadata_extractor::{AppState, create_app};
use serde_json::Value;
use std::io::Cursor;
use std::path::Path;
use tempfile::TempDir;
use tower::ServiceExt;

pub const BOUNDARY: &str = "---------------------------123456789012345678901234567";

/// App wired to a throwaway scratch root; keep the `TempDir` alive for the test
pub fn setup_app() -> (Router, TempDir) {
    setup_app_with(ExtractorConfig::development())
}

pub fn setup_app_with(config: ExtractorConfig) -> (Router, TempDir) {
    let scratch = TempDir::new().unwrap();
    let config = config.with_scratch_dir(scratch.path());
    (create_app(AppState { config }), scratch)
}

pub fn scratch_entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

pub enum Part<'a> {
    File {
        field: &'a str,
        filename: &'a str,
        content: &'a [u8],
    },
    Text {
        field: &'a str,
        value: &'a str,
    },
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::File {
                field,
                filename,
                content,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(content);
            }
            Part::Text { field, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{field}\"\r\n\r\n{value}")
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn file_part<'a>(filename: &'a str, content: &'a [u8]) -> Part<'a> {
    Part::File {
        field: "file",
        filename,
        content,
    }
}

pub async fn post_upload(app: &Router, parts: &[Part<'_>]) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/upload")
                .header(
                    "Content-Type",
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(multipart_body(parts)))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body)
        .unwrap_or_else(|_| panic!("non-JSON body ({status}): {}", String::from_utf8_lossy(&body)));
    (status, json)
}

/// POST arbitrary bytes to `/upload`, optionally with a Content-Type header
pub async fn post_raw(
    app: &Router,
    content_type: Option<&str>,
    body: &'static [u8],
) -> (StatusCode, Option<String>, Value) {
    let mut request = Request::builder().method("POST").uri("/upload");
    if let Some(content_type) = content_type {
        request = request.header("Content-Type", content_type);
    }

    let response = app
        .clone()
        .oneshot(request.body(Body::from(body)).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let response_type = response
        .headers()
        .get("content-type")
        .map(|v| v.to_str().unwrap().to_string());
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body)
        .unwrap_or_else(|_| panic!("non-JSON body ({status}): {}", String::from_utf8_lossy(&body)));
    (status, response_type, json)
}

pub fn encode_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::new(width, height))
        .write_to(&mut Cursor::new(&mut buf), format)
        .unwrap();
    buf
}

/// JPEG with an APP1 EXIF segment holding Make = "TestCam" and Orientation = 6
pub fn jpeg_with_exif(width: u32, height: u32) -> Vec<u8> {
    let mut tiff = vec![b'M', b'M', 0x00, 0x2A, 0, 0, 0, 8];
    tiff.extend_from_slice(&[0x00, 0x02]);
    tiff.extend_from_slice(&[0x01, 0x0F, 0x00, 0x02, 0, 0, 0, 8, 0, 0, 0, 38]);
    tiff.extend_from_slice(&[0x01, 0x12, 0x00, 0x03, 0, 0, 0, 1, 0x00, 0x06, 0, 0]);
    tiff.extend_from_slice(&[0, 0, 0, 0]);
    tiff.extend_from_slice(b"TestCam\0");

    let mut payload = b"Exif\0\0".to_vec();
    payload.extend(tiff);

    let jpeg = encode_image(width, height, ImageFormat::Jpeg);
    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    out.extend(payload);
    out.extend_from_slice(&jpeg[2..]);
    out
}

pub fn build_pdf(pages: usize, info: Option<Dictionary>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = (0..pages)
        .map(|_| {
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            })
            .into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    if let Some(info) = info {
        let info_id = doc.add_object(info);
        doc.trailer.set("Info", info_id);
    }

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

pub fn pdf_by(author: &str, pages: usize) -> Vec<u8> {
    build_pdf(
        pages,
        Some(dictionary! {
            "Author" => Object::string_literal(author),
            "Producer" => Object::string_literal("lopdf"),
        }),
    )
}
