use std::io;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::limits::MAX_REQUEST_LINE_LEN;
use crate::model::*;
use crate::observability::{REQUEST_DURATION_SECONDS, REQUESTS_TOTAL, request_label};
use crate::worker::{BookingHandle, JobHandle, JobQueueStats, Slot};

/// One request per input line, tagged by `"op"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    SubmitJob {
        name: String,
        #[serde(default)]
        pages: u32,
        priority: PriorityClass,
    },
    ServeNext,
    PeekNext,
    ListJobs,
    SearchJobs {
        term: String,
    },
    JobStats,
    ClearJobs,
    AddBooking {
        room: String,
        date: Date,
        start: TimeOfDay,
        end: TimeOfDay,
        #[serde(default)]
        owner: Option<String>,
    },
    CancelBooking {
        id: BookingId,
    },
    IsAvailable {
        room: String,
        date: Date,
        start: TimeOfDay,
        end: TimeOfDay,
    },
    ListBookings,
    FindBooking {
        room: String,
        date: Date,
        start: TimeOfDay,
        end: TimeOfDay,
    },
}

/// Payload of a successful request. `Done` encodes as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    Job(ScheduledJob),
    Jobs(Vec<ScheduledJob>),
    Stats(JobQueueStats),
    Booking(Booking),
    Bookings(Vec<Booking>),
    Available(bool),
    Done,
}

/// One response per output line: `{"ok": ...}` or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Response {
    Ok(Reply),
    Error(String),
}

impl From<Result<Reply>> for Response {
    fn from(r: Result<Reply>) -> Self {
        match r {
            Ok(reply) => Response::Ok(reply),
            Err(e) => Response::Error(e.to_string()),
        }
    }
}

/// Routes decoded requests to the scheduler workers.
#[derive(Debug, Clone)]
pub struct Handler {
    jobs: JobHandle,
    bookings: BookingHandle,
}

impl Handler {
    pub fn new(jobs: JobHandle, bookings: BookingHandle) -> Self {
        Self { jobs, bookings }
    }

    pub async fn execute(&self, req: Request) -> Result<Reply> {
        match req {
            Request::SubmitJob {
                name,
                pages,
                priority,
            } => {
                let job = self.jobs.submit(JobPayload::new(name, pages), priority).await?;
                Ok(Reply::Job(job))
            }
            Request::ServeNext => Ok(Reply::Job(self.jobs.serve_next().await?)),
            Request::PeekNext => Ok(Reply::Job(self.jobs.peek_next().await?)),
            Request::ListJobs => Ok(Reply::Jobs(self.jobs.list_all().await?)),
            Request::SearchJobs { term } => Ok(Reply::Jobs(self.jobs.search_by_name(term).await?)),
            Request::JobStats => Ok(Reply::Stats(self.jobs.stats().await?)),
            Request::ClearJobs => {
                self.jobs.clear().await?;
                Ok(Reply::Done)
            }
            Request::AddBooking {
                room,
                date,
                start,
                end,
                owner,
            } => {
                let slot = Slot {
                    room,
                    date,
                    start,
                    end,
                };
                Ok(Reply::Booking(self.bookings.add(slot, owner).await?))
            }
            Request::CancelBooking { id } => Ok(Reply::Booking(self.bookings.cancel(id).await?)),
            Request::IsAvailable {
                room,
                date,
                start,
                end,
            } => {
                let slot = Slot {
                    room,
                    date,
                    start,
                    end,
                };
                Ok(Reply::Available(self.bookings.is_available(slot).await?))
            }
            Request::ListBookings => Ok(Reply::Bookings(self.bookings.list_chronological().await?)),
            Request::FindBooking {
                room,
                date,
                start,
                end,
            } => {
                let slot = Slot {
                    room,
                    date,
                    start,
                    end,
                };
                Ok(Reply::Booking(self.bookings.find_exact(slot).await?))
            }
        }
    }

    /// Decode, execute and record metrics for one raw line.
    async fn handle_line(&self, line: &[u8]) -> Response {
        let req: Request = match serde_json::from_slice(line) {
            Ok(req) => req,
            Err(e) => {
                debug!("malformed request: {e}");
                metrics::counter!(REQUESTS_TOTAL, "op" => "invalid", "status" => "error").increment(1);
                return Response::Error(format!("malformed request: {e}"));
            }
        };

        let op = request_label(&req);
        let started = Instant::now();
        let result = self.execute(req).await;
        let status = if result.is_ok() { "ok" } else { "error" };
        metrics::counter!(REQUESTS_TOTAL, "op" => op, "status" => status).increment(1);
        metrics::histogram!(REQUEST_DURATION_SECONDS, "op" => op)
            .record(started.elapsed().as_secs_f64());
        if let Err(e) = &result {
            debug!(op, "request failed: {e}");
        }
        result.into()
    }
}

enum Line {
    Eof,
    Complete,
    TooLong,
}

/// Read one `\n`-terminated line into `buf`, never buffering more than
/// `MAX_REQUEST_LINE_LEN` bytes of it. An overlong line is consumed and
/// discarded.
async fn read_line<R>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<Line>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let limit = MAX_REQUEST_LINE_LEN as u64 + 1;
    let n = (&mut *reader).take(limit).read_until(b'\n', buf).await?;
    if n == 0 {
        return Ok(Line::Eof);
    }
    if buf.last() == Some(&b'\n') || (n as u64) < limit {
        return Ok(Line::Complete);
    }

    let mut skipped = Vec::new();
    loop {
        skipped.clear();
        let m = (&mut *reader).take(limit).read_until(b'\n', &mut skipped).await?;
        if m == 0 || skipped.last() == Some(&b'\n') {
            return Ok(Line::TooLong);
        }
    }
}

fn encode(resp: &Response) -> Vec<u8> {
    let mut out = serde_json::to_vec(resp)
        .unwrap_or_else(|_| br#"{"error":"response could not be encoded"}"#.to_vec());
    out.push(b'\n');
    out
}

/// Run the JSON-lines loop until `reader` reaches EOF. Returns the number of
/// responses written.
pub async fn serve<R, W>(mut reader: R, mut writer: W, handler: &Handler) -> io::Result<u64>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();
    let mut answered = 0u64;
    loop {
        let resp = match read_line(&mut reader, &mut buf).await? {
            Line::Eof => break,
            Line::TooLong => {
                warn!("dropping request line over {MAX_REQUEST_LINE_LEN} bytes");
                Response::Error(Error::LimitExceeded("request line too long").to_string())
            }
            Line::Complete => {
                let line = buf.trim_ascii();
                if line.is_empty() {
                    continue;
                }
                handler.handle_line(line).await
            }
        };
        writer.write_all(&encode(&resp)).await?;
        writer.flush().await?;
        answered += 1;
    }
    info!(answered, "input closed");
    Ok(answered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::IntervalBookingScheduler;
    use crate::jobs::PriorityJobScheduler;
    use crate::worker::{spawn_booking_worker, spawn_job_worker};
    use serde_json::Value;

    fn handler(job_capacity: usize) -> Handler {
        let (jobs, _) = spawn_job_worker(PriorityJobScheduler::new(job_capacity), 16);
        let (bookings, _) = spawn_booking_worker(IntervalBookingScheduler::new(), 16);
        Handler::new(jobs, bookings)
    }

    async fn run(handler: &Handler, input: &str) -> Vec<Value> {
        let mut out = Vec::new();
        serve(input.as_bytes(), &mut out, handler).await.unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    // ── Decoding ─────────────────────────────────────────

    #[test]
    fn decodes_tagged_requests() {
        let req: Request = serde_json::from_str(
            r#"{"op":"add_booking","room":"A101","date":"2025-01-01","start":"09:00","end":"10:00"}"#,
        )
        .unwrap();
        assert_eq!(
            req,
            Request::AddBooking {
                room: "A101".into(),
                date: "2025-01-01".parse().unwrap(),
                start: "09:00".parse().unwrap(),
                end: "10:00".parse().unwrap(),
                owner: None,
            }
        );

        let req: Request = serde_json::from_str(r#"{"op":"serve_next"}"#).unwrap();
        assert_eq!(req, Request::ServeNext);

        assert!(serde_json::from_str::<Request>(r#"{"op":"submit_job","name":"x","priority":"URGENT"}"#).is_err());
        assert!(serde_json::from_str::<Request>(r#"{"op":"add_booking","room":"A","date":"2025-02-30","start":"09:00","end":"10:00"}"#).is_err());
    }

    #[test]
    fn encodes_ok_and_error() {
        assert_eq!(encode(&Response::Ok(Reply::Done)), b"{\"ok\":null}\n");
        assert_eq!(encode(&Response::Ok(Reply::Available(true))), b"{\"ok\":true}\n");
        assert_eq!(
            encode(&Response::from(Err::<Reply, _>(Error::EmptyStructure))),
            b"{\"error\":\"structure is empty\"}\n"
        );
    }

    // ── Loop ─────────────────────────────────────────────

    #[tokio::test]
    async fn mock_io_exact_lines() {
        let h = handler(4);
        let reader = tokio_test::io::Builder::new()
            .read(b"{\"op\":\"serve_next\"}\n")
            .read(b"\n")
            .read(b"{\"op\":\"clear_jobs\"}\n")
            .build();
        let writer = tokio_test::io::Builder::new()
            .write(b"{\"error\":\"structure is empty\"}\n")
            .write(b"{\"ok\":null}\n")
            .build();
        let answered = serve(tokio::io::BufReader::new(reader), writer, &h).await.unwrap();
        assert_eq!(answered, 2);
    }

    #[tokio::test]
    async fn job_session() {
        let h = handler(3);
        let input = [
            r#"{"op":"submit_job","name":"a.pdf","pages":1,"priority":"LOW"}"#,
            r#"{"op":"submit_job","name":"b.pdf","pages":2,"priority":"HIGH"}"#,
            r#"{"op":"submit_job","name":"c.pdf","pages":3,"priority":"NORMAL"}"#,
            r#"{"op":"submit_job","name":"d.pdf","pages":4,"priority":"HIGH"}"#,
            r#"{"op":"job_stats"}"#,
            r#"{"op":"search_jobs","term":"B.PDF"}"#,
            r#"{"op":"serve_next"}"#,
            r#"{"op":"peek_next"}"#,
        ]
        .join("\n");
        let out = run(&h, &input).await;
        assert_eq!(out.len(), 8);

        assert_eq!(out[0]["ok"]["id"], 1);
        assert_eq!(out[1]["ok"]["priority"], "HIGH");
        assert_eq!(out[3]["error"], "capacity 3 exceeded");
        assert_eq!(out[4]["ok"]["size"], 3);
        assert_eq!(out[4]["ok"]["is_full"], true);
        assert_eq!(out[4]["ok"]["counts"]["normal"], 1);
        assert_eq!(out[5]["ok"].as_array().unwrap().len(), 1);
        assert_eq!(out[6]["ok"]["id"], 2);
        assert!(out[6]["ok"]["served_at"].is_i64());
        assert_eq!(out[7]["ok"]["id"], 3);
    }

    #[tokio::test]
    async fn booking_session() {
        let h = handler(1);
        let input = [
            r#"{"op":"add_booking","room":"A101","date":"2025-01-01","start":"09:00","end":"10:00","owner":"dr.lee"}"#,
            r#"{"op":"add_booking","room":"A101","date":"2025-01-01","start":"09:30","end":"10:30"}"#,
            r#"{"op":"add_booking","room":"A101","date":"2025-01-01","start":"10:00","end":"11:00"}"#,
            r#"{"op":"is_available","room":"a101","date":"2025-01-01","start":"10:30","end":"10:45"}"#,
            r#"{"op":"add_booking","room":"A101","date":"2024-12-31","start":"08:00","end":"09:00"}"#,
            r#"{"op":"list_bookings"}"#,
            r#"{"op":"cancel_booking","id":2}"#,
            r#"{"op":"find_booking","room":"A101","date":"2025-01-01","start":"10:00","end":"11:00"}"#,
            r#"{"op":"add_booking","room":"A101","date":"2025-01-01","start":"11:00","end":"10:00"}"#,
        ]
        .join("\n");
        let out = run(&h, &input).await;

        assert_eq!(out[0]["ok"]["id"], 1);
        assert_eq!(out[0]["ok"]["owner"], "dr.lee");
        assert_eq!(out[1]["error"], "conflict with booking: #1");
        assert_eq!(out[2]["ok"]["id"], 2);
        assert_eq!(out[3]["ok"], false);

        let listed: Vec<u64> = out[5]["ok"]
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["id"].as_u64().unwrap())
            .collect();
        assert_eq!(listed, [3, 1, 2]);
        assert_eq!(out[5]["ok"][0]["date"], "2024-12-31");

        assert_eq!(out[6]["ok"]["start"], "10:00");
        assert!(out[7]["error"].as_str().unwrap().starts_with("not found"));
        assert!(out[8]["error"].as_str().unwrap().starts_with("invalid interval"));
    }

    #[tokio::test]
    async fn malformed_lines_do_not_stop_the_loop() {
        let h = handler(2);
        let out = run(&h, "not json\n{\"op\":\"teleport\"}\n{\"op\":\"list_jobs\"}\n").await;
        assert_eq!(out.len(), 3);
        assert!(out[0]["error"].as_str().unwrap().starts_with("malformed request"));
        assert!(out[1]["error"].is_string());
        assert_eq!(out[2]["ok"], Value::Array(vec![]));
    }

    #[tokio::test]
    async fn overlong_line_is_rejected_and_skipped() {
        let h = handler(2);
        let big = format!(
            "{{\"op\":\"search_jobs\",\"term\":\"{}\"}}\n",
            "x".repeat(MAX_REQUEST_LINE_LEN)
        );
        let input = format!("{big}{{\"op\":\"job_stats\"}}\n");
        let out = run(&h, &input).await;
        assert_eq!(out.len(), 2);
        assert_eq!(out[0]["error"], "limit exceeded: request line too long");
        assert_eq!(out[1]["ok"]["size"], 0);
    }

    #[tokio::test]
    async fn final_line_without_newline_is_served() {
        let h = handler(2);
        let out = run(&h, r#"{"op":"list_bookings"}"#).await;
        assert_eq!(out, [serde_json::json!({"ok": []})]);
    }
}
