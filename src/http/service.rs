//! `may_minihttp` adapter.

use crate::http::request::HttpRequest;
use crate::http::response::{HttpReply, CONTENT_TYPE_HTML, CONTENT_TYPE_TEXT};
use crate::http::App;
use may_minihttp::{HttpService, Request, Response};
use std::io::{self, Read};
use std::sync::Arc;

const CLEAR_ACCOUNT_ID_COOKIE: &str = "Set-Cookie: account_id=; Max-Age=0; Path=/";
const CLEAR_TOKEN_COOKIE: &str = "Set-Cookie: token=; Max-Age=0; Path=/";

#[derive(Clone)]
pub struct CourtsideService {
    app: Arc<App>,
}

impl CourtsideService {
    pub fn new(app: Arc<App>) -> Self {
        Self { app }
    }
}

impl HttpService for CourtsideService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let request = read_request(req)?;
        let reply = self.app.handle(&request);
        write_reply(reply, res);
        Ok(())
    }
}

fn read_request(req: Request) -> io::Result<HttpRequest> {
    let mut request = HttpRequest::new(req.method(), req.path());
    for header in req.headers() {
        request = request.with_header(header.name, &String::from_utf8_lossy(header.value));
    }
    let mut body = Vec::new();
    req.body().read_to_end(&mut body)?;
    Ok(request.with_body(body))
}

fn write_reply(reply: HttpReply, res: &mut Response) {
    res.status_code(usize::from(reply.status), reason_phrase(reply.status));
    res.header(content_type_header(reply.content_type));
    if reply.clear_session {
        res.header(CLEAR_ACCOUNT_ID_COOKIE);
        res.header(CLEAR_TOKEN_COOKIE);
    }
    res.body_vec(reply.body);
}

fn content_type_header(content_type: &str) -> &'static str {
    match content_type {
        CONTENT_TYPE_HTML => "Content-Type: text/html; charset=utf-8",
        CONTENT_TYPE_TEXT => "Content-Type: text/plain; version=0.0.4; charset=utf-8",
        _ => "Content-Type: application/json",
    }
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        409 => "Conflict",
        422 => "Unprocessable Entity",
        _ => "Internal Server Error",
    }
}
