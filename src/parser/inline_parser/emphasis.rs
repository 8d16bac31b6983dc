//! Delimiter-stack emphasis resolution.
//!
//! Closers are taken left to right; each scans back toward `bottom` for the
//! nearest compatible opener. A matched pair consumes one delimiter from
//! each side for emphasis or two for strong, so a run of three resolves to
//! strong wrapped in emphasis over two rounds. Whatever remains unpaired is
//! flattened back into literal text.

use crate::ast::Inline;

use super::Item;

/// The multiple-of-three restriction: a run that can both open and close
/// may not pair with another such run when the combined length is divisible
/// by three, unless both lengths are.
fn rule_of_three(opener_count: usize, opener_closes: bool, closer: (usize, bool)) -> bool {
    let (closer_count, closer_opens) = closer;
    (opener_closes || closer_opens)
        && (opener_count + closer_count) % 3 == 0
        && (opener_count % 3 != 0 || closer_count % 3 != 0)
}

pub(super) fn process_emphasis(items: &mut Vec<Item>, bottom: usize) {
    let mut closer = bottom;
    while closer < items.len() {
        let (ch, closer_count, closer_opens) = match items[closer] {
            Item::Delim {
                ch,
                count,
                can_close: true,
                can_open,
            } if count > 0 => (ch, count, can_open),
            _ => {
                closer += 1;
                continue;
            }
        };

        let mut opener = None;
        let mut j = closer;
        while j > bottom {
            j -= 1;
            if let Item::Delim {
                ch: opener_ch,
                count: opener_count,
                can_open: true,
                can_close: opener_closes,
            } = items[j]
            {
                if opener_ch == ch && opener_count > 0 {
                    if ch != b'~'
                        && rule_of_three(opener_count, opener_closes, (closer_count, closer_opens))
                    {
                        continue;
                    }
                    opener = Some((j, opener_count));
                    break;
                }
            }
        }

        let Some((op, opener_count)) = opener else {
            closer += 1;
            continue;
        };

        let use_delims = if ch == b'~' || (closer_count >= 2 && opener_count >= 2) {
            2
        } else {
            1
        };
        let children = flatten(items.drain(op + 1..closer).collect());
        let node = match (ch, use_delims) {
            (b'~', _) => Inline::Strikethrough(children),
            (_, 2) => Inline::Strong(children),
            _ => Inline::Emphasis(children),
        };

        let opener_spent = match &mut items[op] {
            Item::Delim { count, .. } => {
                *count -= use_delims;
                *count == 0
            }
            _ => false,
        };
        let closer_spent = match &mut items[op + 1] {
            Item::Delim { count, .. } => {
                *count -= use_delims;
                *count == 0
            }
            _ => false,
        };
        items.insert(op + 1, Item::Node(node));

        // Layout is now opener, node, closer.
        let mut closer_idx = op + 2;
        if closer_spent {
            items.remove(closer_idx);
        }
        if opener_spent {
            items.remove(op);
            closer_idx -= 1;
        }
        closer = closer_idx;
    }
}

fn append_text(out: &mut Vec<Inline>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Inline::Text(last)) = out.last_mut() {
        last.push_str(text);
    } else {
        out.push(Inline::Text(text.to_string()));
    }
}

/// Turn leftover work items into the final inline sequence, degrading
/// unpaired delimiters and brackets to literal text.
pub(super) fn flatten(items: Vec<Item>) -> Vec<Inline> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Item::Text(text) => append_text(&mut out, &text),
            Item::Node(node) => out.push(node),
            Item::Delim { ch, count, .. } => {
                let literal = (ch as char).to_string().repeat(count);
                append_text(&mut out, &literal);
            }
            Item::BracketOpen { image, .. } => {
                append_text(&mut out, if image { "![" } else { "[" });
            }
        }
    }
    out
}
