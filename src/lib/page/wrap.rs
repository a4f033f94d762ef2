/// Greedy word wrap of `text` into lines of at most `width` characters.
///
/// Newlines in `text` are kept as hard breaks, blank lines only survive between
/// content. A break lands on the last space that keeps the line within `width`;
/// a single token longer than `width` is cut into `width`-sized pieces.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);

    let source: Vec<&str> = text.lines().map(str::trim_end).collect();
    let first = source.iter().position(|line| !line.trim().is_empty());
    let last = source.iter().rposition(|line| !line.trim().is_empty());

    let (Some(first), Some(last)) = (first, last) else {
        return vec![];
    };

    source[first..=last]
        .iter()
        .flat_map(|line| wrap_line(line, width))
        .collect()
}

fn wrap_line(line: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    let mut started = false;

    // Every single space is a break point, the space itself is dropped at a break.
    // Runs of spaces show up as empty words, so spacing and indentation survive.
    for mut word in line.split(' ') {
        let mut word_len = word.chars().count();

        if started {
            if current_len + 1 + word_len <= width {
                current.push(' ');
                current.push_str(word);
                current_len += 1 + word_len;
                continue;
            }

            lines.push(std::mem::take(&mut current));
        }
        started = true;

        while word_len > width {
            let split = word
                .char_indices()
                .nth(width)
                .map_or(word.len(), |(index, _)| index);
            lines.push(word[..split].to_string());
            word = &word[split..];
            word_len -= width;
        }

        current.push_str(word);
        current_len = word_len;
    }

    lines.push(current);
    lines
}
