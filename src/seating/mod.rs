//! seating
//!
//! Чистая логика рассадки: разбор кодов мест, построение схемы зала и
//! генерация мест для новой комнаты. Никакого I/O, все функции
//! детерминированы и безопасны для конкурентного вызова.

pub mod generate;
pub mod grid;

pub use generate::{available_columns, generate_seats, NewSeat};
pub use grid::{build_layout, GridCell, GridRow, SeatingGrid, SeatingLayout};

use serde::Serialize;

use crate::models::Seat;

/// Позиция места в зале: буква столбца и номер ряда.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeatPosition {
    pub row: char,
    pub column: u32,
}

/// Определяет позицию места.
///
/// Явно заданные row/column имеют приоритет; иначе позиция разбирается из
/// seat_code: первый символ - буква столбца, остаток - номер ряда.
/// Неразборчивый код даёт None, такое место в схему не попадает.
pub fn seat_position(seat: &Seat) -> Option<SeatPosition> {
    if let (Some(letter), Some(column)) = (seat.row_letter.as_deref(), seat.col_number) {
        if let Some(row) = letter.chars().next() {
            let column = u32::try_from(column).ok().filter(|c| *c >= 1)?;
            return Some(SeatPosition { row, column });
        }
    }

    let mut chars = seat.seat_code.chars();
    let row = chars.next()?;
    let column = chars.as_str().parse::<u32>().ok().filter(|c| *c >= 1)?;
    Some(SeatPosition { row, column })
}

/// Разбирает список пропущенных букв из строки вида "D, G".
pub fn parse_skip_list(input: &str) -> Vec<char> {
    input
        .split(',')
        .filter_map(|token| token.trim().chars().next())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Неизменяемая конфигурация отрисовки: цвета статусов и метрики
/// расстановки. Значения по умолчанию повторяют классную тему.
#[derive(Debug, Clone, Serialize)]
pub struct SeatingTheme {
    pub available_color: String,
    pub occupied_color: String,
    pub desk_width: u32,
    pub desk_height: u32,
    pub chair_size: u32,
    pub seat_code_size: u32,
    pub row_label_size: u32,
    pub seat_spacing: u32,
    pub row_spacing: u32,
}

impl Default for SeatingTheme {
    fn default() -> Self {
        Self {
            available_color: "#4CAF50".to_string(),
            occupied_color: "#F44336".to_string(),
            desk_width: 50,
            desk_height: 30,
            chair_size: 22,
            seat_code_size: 14,
            row_label_size: 24,
            seat_spacing: 16,
            row_spacing: 20,
        }
    }
}

impl SeatingTheme {
    /// Полная ширина ячейки с местом.
    pub fn cell_width(&self) -> u32 {
        self.desk_width + 10
    }

    /// Ширина узкой заглушки для пропущенного столбца.
    pub fn placeholder_width(&self) -> u32 {
        self.cell_width() / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seat(code: &str) -> Seat {
        Seat {
            id: 0,
            room_id: 0,
            seat_code: code.to_string(),
            row_letter: None,
            col_number: None,
            status: "Available".to_string(),
            student_id: None,
            exam_id: None,
        }
    }

    #[test]
    fn parses_row_and_column_from_code() {
        let pos = seat_position(&seat("D5")).unwrap();
        assert_eq!(pos.row, 'D');
        assert_eq!(pos.column, 5);

        let pos = seat_position(&seat("B12")).unwrap();
        assert_eq!(pos.row, 'B');
        assert_eq!(pos.column, 12);
    }

    #[test]
    fn explicit_fields_win_over_code() {
        let mut s = seat("Z9");
        s.row_letter = Some("B".to_string());
        s.col_number = Some(2);
        let pos = seat_position(&s).unwrap();
        assert_eq!(pos.row, 'B');
        assert_eq!(pos.column, 2);
    }

    #[test]
    fn code_without_digits_is_unplaceable() {
        assert!(seat_position(&seat("D")).is_none());
        assert!(seat_position(&seat("")).is_none());
        assert!(seat_position(&seat("Dx7")).is_none());
    }

    #[test]
    fn partial_explicit_fields_fall_back_to_code() {
        let mut s = seat("C3");
        s.row_letter = Some("A".to_string());
        // col_number отсутствует, значит явные поля неполные
        let pos = seat_position(&s).unwrap();
        assert_eq!(pos.row, 'C');
        assert_eq!(pos.column, 3);
    }

    #[test]
    fn nonpositive_columns_are_rejected() {
        let mut s = seat("A0");
        assert!(seat_position(&s).is_none());
        s.seat_code = "A1".to_string();
        s.row_letter = Some("A".to_string());
        s.col_number = Some(0);
        assert!(seat_position(&s).is_none());
    }

    #[test]
    fn skip_list_parsing_is_lenient() {
        assert_eq!(parse_skip_list("D, G"), vec!['D', 'G']);
        assert_eq!(parse_skip_list("b"), vec!['B']);
        assert_eq!(parse_skip_list(""), Vec::<char>::new());
        assert_eq!(parse_skip_list(" , D ,"), vec!['D']);
    }
}
