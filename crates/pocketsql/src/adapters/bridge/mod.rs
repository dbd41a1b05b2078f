//! Line-oriented JSON host protocol over stdio.

mod handler;
mod io;
mod protocol;

use std::io::{BufRead, Write};

use crate::{
    cli::Args,
    core::worker::SessionHandle,
    error::{AppError, AppResult},
};

use handler::BridgeHandler;
use io::NdjsonIo;
use protocol::{BridgeRequest, PROTOCOL_VERSION};

pub fn run(args: Args) -> AppResult<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| AppError::Internal(e.to_string()))?;

    rt.block_on(async move {
        let session = SessionHandle::spawn(&args.data_dir)?;
        tracing::info!(data_dir = %args.data_dir.display(), "bridge ready");

        if args.sample {
            let r = session.load_sample().await?;
            tracing::info!(success = r.success, "{}", r.message);
        }

        serve(&mut NdjsonIo::stdio(), BridgeHandler::new(session)).await
    })
}

async fn serve<R: BufRead, W: Write>(
    io: &mut NdjsonIo<R, W>,
    mut handler: BridgeHandler,
) -> AppResult<()> {
    loop {
        let Some(line) = io.read_line()? else { break };
        if line.is_empty() {
            continue;
        }

        let req: BridgeRequest = match serde_json::from_str(&line) {
            Ok(r) => r,
            Err(e) => {
                // id unknown; still answer so the host is not left waiting
                io.protocol_error(String::new(), PROTOCOL_VERSION, e.to_string())?;
                continue;
            }
        };

        let resp = handler.handle(req).await;
        io.write_json_line(&resp)?;

        if handler.should_exit() {
            tracing::info!("exit requested");
            break;
        }
    }

    Ok(())
}
