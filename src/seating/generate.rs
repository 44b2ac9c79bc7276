//! Генерация мест для новой комнаты: rows x columns с пропуском
//! перечисленных букв, как это делала форма создания комнаты.

use serde::Serialize;

/// Место, подготовленное к вставке. Позиция записывается явно, чтобы
/// дальше не зависеть от разбора кода.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSeat {
    pub seat_code: String,
    pub row_letter: char,
    pub col_number: u32,
    pub status: &'static str,
}

/// Первые `count` букв алфавита без пропущенных. Алфавит из 26 букв,
/// дальше 'Z' столбцы не выдаются.
pub fn available_columns(count: u32, skipped: &[char]) -> Vec<char> {
    ('A'..='Z')
        .filter(|letter| !skipped.contains(letter))
        .take(count as usize)
        .collect()
}

/// Генерирует места обходом ряд за рядом: код `<буква><ряд>`, все места
/// изначально свободны.
pub fn generate_seats(num_rows: u32, num_columns: u32, skipped: &[char]) -> Vec<NewSeat> {
    let columns = available_columns(num_columns, skipped);
    let mut seats = Vec::with_capacity((num_rows as usize) * columns.len());
    for row in 1..=num_rows {
        for &letter in &columns {
            seats.push(NewSeat {
                seat_code: format!("{}{}", letter, row),
                row_letter: letter,
                col_number: row,
                status: "Available",
            });
        }
    }
    seats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_skip_listed_letters() {
        assert_eq!(available_columns(3, &['B']), vec!['A', 'C', 'D']);
        assert_eq!(available_columns(2, &[]), vec!['A', 'B']);
    }

    #[test]
    fn alphabet_is_the_universe() {
        let all: Vec<char> = ('A'..='Z').collect();
        assert_eq!(available_columns(30, &[]), all);
    }

    #[test]
    fn generates_row_major_codes() {
        let seats = generate_seats(2, 2, &['B']);
        let codes: Vec<&str> = seats.iter().map(|s| s.seat_code.as_str()).collect();
        assert_eq!(codes, vec!["A1", "C1", "A2", "C2"]);
        assert!(seats.iter().all(|s| s.status == "Available"));
    }

    #[test]
    fn zero_dimensions_generate_nothing() {
        assert!(generate_seats(0, 4, &[]).is_empty());
        assert!(generate_seats(4, 0, &[]).is_empty());
    }
}
