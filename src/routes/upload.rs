// ABOUTME: Upload route handlers: form page, multipart intake, sport rewrite, and file download
// ABOUTME: The HTTP boundary around the rewrite pipeline - validation errors render the form, files stream back
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Upload and download routes.
//!
//! `GET /` serves the upload form; `POST /` takes a multipart body with a
//! `.fit` file and a sport value, runs the rewrite pipeline, and answers
//! with an `application/octet-stream` download named
//! `modified_<original>`. Fallback warnings travel in the `x-fit-warning`
//! header so the caller still receives a file; fatal validation errors
//! re-render the form with the error message and no file.

use axum::{
    extract::Multipart,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use bytes::Bytes;
use tracing::{info, warn};

use crate::constants::{defaults, upload};
use crate::errors::AppError;
use crate::models::Sport;
use crate::rewrite;

/// Upload routes implementation
pub struct UploadRoutes;

impl UploadRoutes {
    /// Create the upload form and rewrite routes
    #[must_use]
    pub fn routes() -> Router {
        Router::new().route("/", get(Self::handle_form).post(Self::handle_upload))
    }

    /// Handle GET / - render the upload form
    async fn handle_form() -> Html<String> {
        Html(render_page(None, None))
    }

    /// Handle POST / - rewrite the uploaded file's sport and return it
    async fn handle_upload(mut multipart: Multipart) -> Result<Response, AppError> {
        let mut file: Option<(String, Bytes)> = None;
        let mut sport = defaults::SPORT.to_owned();

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            AppError::invalid_format(format!("Malformed multipart body: {e}"))
        })? {
            let name = field.name().map(str::to_owned);
            match name.as_deref() {
                Some("file") => {
                    let filename = field
                        .file_name()
                        .map_or_else(|| upload::DEFAULT_FILENAME.to_owned(), str::to_owned);
                    let bytes = field.bytes().await.map_err(|e| {
                        AppError::invalid_format(format!("Failed to read upload: {e}"))
                    })?;
                    file = Some((filename, bytes));
                }
                Some("sport") => {
                    sport = field.text().await.map_err(|e| {
                        AppError::invalid_format(format!("Failed to read sport field: {e}"))
                    })?;
                }
                _ => {}
            }
        }

        let Some((filename, bytes)) = file else {
            return Ok(error_page("No file was selected"));
        };
        if !has_fit_extension(&filename) {
            return Ok(error_page(
                "Invalid file. Please upload a .fit activity file",
            ));
        }

        info!(
            filename = %filename,
            size = bytes.len(),
            sport = %sport,
            "processing upload"
        );

        // Both fatal kinds (invalid sport, empty upload) surface on the form
        // with no file attached; everything else came back as an outcome.
        let outcome = match rewrite::rewrite_sport(&bytes, &sport) {
            Ok(outcome) => outcome,
            Err(err) => return Ok(error_page(&err.to_string())),
        };

        Ok(download_response(&filename, outcome.bytes, outcome.warning))
    }
}

/// Case-insensitive check for the `.fit` extension
fn has_fit_extension(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case(upload::FIT_EXTENSION))
}

/// Build the attachment response, carrying any warning in a header
fn download_response(original_name: &str, bytes: Vec<u8>, warning: Option<String>) -> Response {
    let download_name = format!(
        "{}{}",
        upload::DOWNLOAD_PREFIX,
        sanitize_filename(original_name)
    );

    let mut response = (
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                "application/octet-stream".to_owned(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{download_name}\""),
            ),
        ],
        bytes,
    )
        .into_response();

    if let Some(message) = warning {
        warn!(warning = %message, "returning file with warning");
        if let Ok(value) = header::HeaderValue::from_str(&sanitize_header_value(&message)) {
            response
                .headers_mut()
                .insert(upload::WARNING_HEADER, value);
        }
    }
    response
}

/// Keep download filenames header-safe
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '"' | '\\' | '/' | ':' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect()
}

/// Header values must be visible ASCII
fn sanitize_header_value(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            if c.is_ascii() && !c.is_ascii_control() {
                c
            } else {
                '?'
            }
        })
        .collect()
}

/// Render the form with an error banner at 400
fn error_page(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Html(render_page(Some(message), None))).into_response()
}

/// Render the upload page, optionally with error/warning banners
fn render_page(error: Option<&str>, warning: Option<&str>) -> String {
    let mut banners = String::new();
    if let Some(message) = error {
        banners.push_str(&format!(
            "<p class=\"error\">{}</p>\n",
            html_escape::encode_text(message)
        ));
    }
    if let Some(message) = warning {
        banners.push_str(&format!(
            "<p class=\"warning\">{}</p>\n",
            html_escape::encode_text(message)
        ));
    }

    let mut options = String::new();
    for sport in Sport::ALL {
        let selected = if sport.as_str() == defaults::SPORT {
            " selected"
        } else {
            ""
        };
        options.push_str(&format!(
            "<option value=\"{value}\"{selected}>{value}</option>\n",
            value = sport.as_str()
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>fitmend - FIT sport rewriter</title>
<style>
body {{ font-family: sans-serif; max-width: 36rem; margin: 3rem auto; }}
.error {{ color: #b00020; }}
.warning {{ color: #8a6d00; }}
</style>
</head>
<body>
<h1>FIT sport rewriter</h1>
<p>Upload a .fit activity file and choose the sport it should carry.</p>
{banners}<form method="post" enctype="multipart/form-data">
<p><input type="file" name="file" accept=".fit" required></p>
<p><select name="sport">
{options}</select></p>
<p><button type="submit">Rewrite and download</button></p>
</form>
</body>
</html>
"#
    )
}
