/*
 * Copyright © 2026, The Water Institute of the Gulf. All rights reserved.
 *
 * The “MetGet” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

//! the build worker. Claims runnable requests from the request table, runs
//! each end to end through the MessageHandler and finalizes the request row.

use chrono::{Duration, Utc};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use metget_build::{Context, Input, MessageHandler, MetgetBuildError, ProcessOutcome};
use metget_catalog::{RequestRow, RequestStatus};

#[derive(Parser, Debug)]
#[command(about = "MetGet meteorological forcing build worker")]
struct Args {
    /// validate a request JSON file, queue it and exit
    #[arg(long, value_name = "FILE")]
    submit: Option<std::path::PathBuf>,

    /// process a single request and exit
    #[arg(long)]
    one_shot: bool,

    /// create the catalog tables at startup
    #[arg(long)]
    init_tables: bool,

    /// seconds to idle between queue polls
    #[arg(long, default_value_t = 10)]
    poll_interval: u64,
}

#[tokio::main]
async fn main ()->Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter( EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let ctx = Context::initialize().await?;

    if args.init_tables {
        info!("creating catalog tables");
        ctx.catalog.create_tables().await?;
    }

    if let Some(path) = &args.submit {
        submit_request( &ctx, path).await?;
        return Ok(())
    }

    info!("build worker started");

    loop {
        let claimed = ctx.catalog.claim_next_request( ctx.config.request_sleep_time).await;

        match claimed {
            Ok(Some(request)) => {
                process_request( &ctx, request).await;
                if args.one_shot {
                    break
                }
            }
            Ok(None) => {
                if args.one_shot {
                    info!("no runnable requests");
                    break
                }
                tokio::time::sleep( std::time::Duration::from_secs( args.poll_interval)).await;
            }
            Err(e) => {
                error!("queue poll failed: {e}");
                tokio::time::sleep( std::time::Duration::from_secs( args.poll_interval)).await;
            }
        }
    }

    Ok(())
}

/// queue a request from a JSON file, the enqueue side of the worker's
/// database queue. The payload is validated up front so malformed requests
/// never reach the table
async fn submit_request (ctx: &Context, path: &std::path::Path)->Result<(), Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)?;
    let json: serde_json::Value = serde_json::from_str(&text)?;
    let input = Input::parse(&json)?;

    let api_key = json.get("api_key").and_then(|v| v.as_str()).unwrap_or("");
    let source_ip = json.get("source_ip").and_then(|v| v.as_str()).unwrap_or("127.0.0.1");

    ctx.catalog.add_request(
        input.request_id(), RequestStatus::Queued,
        api_key, source_ip,
        &json, "request queued", input.credit_usage()).await?;

    info!("queued request {} ({} credits)", input.request_id(), input.credit_usage());
    Ok(())
}

async fn process_request (ctx: &Context, request: RequestRow) {
    let request_id = request.request_id.clone();
    info!("claimed request {request_id}");

    //--- validate
    let input = match Input::parse( &request.input_data) {
        Ok(input) => input,
        Err(e) => {
            warn!("request {request_id} failed validation: {e}");
            finalize( ctx, &request_id, RequestStatus::Error, &message_for(&e), 0, true).await;
            return
        }
    };

    if input.dry_run() {
        info!("request {request_id} is a dry run");
        finalize( ctx, &request_id, RequestStatus::Completed, "dry run validated", input.credit_usage(), false).await;
        return
    }

    //--- the total-elapsed ceiling spans restore cycles, so it anchors on the
    //    request row's creation time
    let max_time = Duration::from_std( ctx.config.max_request_time).unwrap_or( Duration::hours(48));
    let deadline = request.start_date + max_time;
    if Utc::now() > deadline {
        finalize( ctx, &request_id, RequestStatus::Error,
            "request exceeded the maximum allowed processing time", input.credit_usage(), true).await;
        return
    }

    let handler = match MessageHandler::new(input) {
        Ok(handler) => handler,
        Err(e) => {
            finalize( ctx, &request_id, RequestStatus::Error, &message_for(&e), 0, true).await;
            return
        }
    };
    let credit = handler.input().credit_usage();

    match handler.process_message( ctx, deadline).await {
        Ok(ProcessOutcome::Completed) => {
            finalize( ctx, &request_id, RequestStatus::Completed, "request complete", credit, true).await;
        }
        Ok(ProcessOutcome::RestoreWait) => {
            // not a try: the request re-enters the queue after the sleep window
            finalize( ctx, &request_id, RequestStatus::Restore, "job is in archive restore status", credit, false).await;
        }
        Err(e) => {
            error!("request {request_id} failed: {e}");
            finalize( ctx, &request_id, RequestStatus::Error, &message_for(&e), credit, true).await;
        }
    }
}

fn message_for (e: &MetgetBuildError)->String {
    format!("{}: {}", e.kind(), e)
}

async fn finalize (ctx: &Context, request_id: &str, status: RequestStatus, message: &str, credit: i64, increment_try: bool) {
    if let Err(e) = ctx.catalog.update_request( request_id, status, message, credit, increment_try).await {
        error!("unable to update request {request_id}: {e}");
    }
}
