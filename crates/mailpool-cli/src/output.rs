use mailpool_core::engine::Decision;
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_decisions(decisions: &[Decision]) {
    let rows: Vec<Vec<String>> = decisions
        .iter()
        .map(|d| {
            vec![
                d.email.clone(),
                d.new_status.as_str().to_string(),
                d.warmup
                    .map(|on| if on { "on" } else { "off" }.to_string())
                    .unwrap_or_default(),
                d.campaigns.map(|c| c.to_string()).unwrap_or_default(),
                d.reason.clone(),
            ]
        })
        .collect();
    print_table(&["EMAIL", "STATUS", "WARMUP", "CAMPAIGNS", "REASON"], &rows);
}

/// Plain aligned columns, two spaces between them, dashed rule under the
/// header.
pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let render = |cells: Vec<String>| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{:width$}", c, width = widths.get(i).copied().unwrap_or(0)))
            .collect::<Vec<String>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    println!(
        "{}",
        render(headers.iter().map(|h| h.to_string()).collect())
    );
    println!("{}", render(widths.iter().map(|w| "-".repeat(*w)).collect()));
    for row in rows {
        println!("{}", render(row.clone()));
    }
}
