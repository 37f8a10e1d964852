use log::debug;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use super::config::ServerConfig;
use super::content_type::content_type;
use super::http_status::HttpStatus;
use super::path_resolver::{resolve_path, resolve_target};
use super::request_parser::RequestContext;

/// How a response came about; both not-found routes look the same to the client.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    Served,
    NotFoundPage,
    ReadFailed,
    Rejected,
}

impl Outcome {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Served => "served",
            Self::NotFoundPage => "not-found page",
            Self::ReadFailed => "read failed",
            Self::Rejected => "rejected",
        }
    }
}

#[derive(Debug)]
pub struct Response {
    pub status: HttpStatus,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    pub target: Option<PathBuf>,
    pub outcome: Outcome,
}

impl Response {
    pub fn bad_request() -> Self {
        Self {
            status: HttpStatus::BadRequest,
            content_type: None,
            body: Vec::new(),
            target: None,
            outcome: Outcome::Rejected,
        }
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let mut headers = self.status.as_response_line();
        if let Some(content_type) = &self.content_type {
            headers.push_str(&format!("Content-Type: {}; charset=utf-8\r\n", content_type));
        }
        headers.push_str(&format!(
            "Content-Length: {}\r\nConnection: close\r\n\r\n",
            self.body.len()
        ));

        writer.write_all(headers.as_bytes())?;
        writer.write_all(&self.body)?;
        writer.flush()
    }
}

pub fn handle(context: &RequestContext, config: &ServerConfig) -> Response {
    let resolved = resolve_target(&context.path, &config.working_directory, &config.home_page);

    let mut status = HttpStatus::Ok;
    let mut outcome = Outcome::Served;
    let mut target = resolved.path;

    if !resolved.is_valid {
        debug!("{:?} is not servable, falling back to not-found page", target);
        target = resolve_path(&config.not_found_page, &config.working_directory, &config.home_page);
        status = HttpStatus::NotFound;
        outcome = Outcome::NotFoundPage;
    }

    match fs::read(&target) {
        Ok(data) => {
            debug!("Read {:?} ({} bytes)", target, data.len());
            Response {
                status,
                content_type: Some(content_type(&target)),
                body: data,
                target: Some(target),
                outcome,
            }
        }
        Err(e) => {
            debug!("Failed to read {:?}: {}", target, e);
            Response {
                status: HttpStatus::NotFound,
                content_type: None,
                body: Vec::new(),
                target: Some(target),
                outcome: Outcome::ReadFailed,
            }
        }
    }
}
