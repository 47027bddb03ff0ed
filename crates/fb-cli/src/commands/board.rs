use fb_core::board::{BoardController, NoticeBoard, ViewCache};
use serde::Serialize;

use super::{fit, friendly_error, Context};

const CARD_WIDTH: usize = 22;

#[derive(Serialize)]
struct BoardJson<'a> {
    funnel_id: &'a str,
    access: Option<String>,
    columns: &'a [fb_core::board::StageColumn],
}

/// Render a funnel as stage columns, one card per lead.
pub async fn show(ctx: &Context, funnel_id: &str) -> anyhow::Result<()> {
    let notices = NoticeBoard::new(ctx.config.board.notice_history);
    let controller = BoardController::load(ctx.client.clone(), funnel_id, notices)
        .await
        .map_err(friendly_error)?;
    let board = controller.snapshot().await;
    let mut cache = ViewCache::new();
    let columns = cache.columns(&board);

    let access = board.access().map(|a| a.to_string());
    if ctx.emit_json(&BoardJson {
        funnel_id,
        access: access.clone(),
        columns,
    })? {
        return Ok(());
    }

    match access {
        Some(a) => println!("Access: {a}{}", if board.can_edit() { "" } else { " (read-only)" }),
        None => println!("Access: unknown (read-only)"),
    }
    if columns.is_empty() {
        println!("This funnel has no stages.");
        return Ok(());
    }

    let header: Vec<String> = columns
        .iter()
        .map(|c| fit(&format!("{} ({})", c.stage.name, c.cards.len()), CARD_WIDTH))
        .collect();
    println!("{}", header.join(" | "));
    let totals: Vec<String> = columns
        .iter()
        .map(|c| fit(&format!("${:.2}", c.total_value()), CARD_WIDTH))
        .collect();
    println!("{}", totals.join(" | "));
    println!("{}", vec!["-".repeat(CARD_WIDTH); columns.len()].join("-+-"));

    let depth = columns.iter().map(|c| c.cards.len()).max().unwrap_or(0);
    for row in 0..depth {
        let cells: Vec<String> = columns
            .iter()
            .map(|c| match c.cards.get(row) {
                Some(card) => fit(&card.name, CARD_WIDTH),
                None => " ".repeat(CARD_WIDTH),
            })
            .collect();
        println!("{}", cells.join(" | "));
    }
    Ok(())
}
