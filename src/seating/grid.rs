//! grid.rs
//!
//! Построение схемы зала из разреженного списка мест комнаты.
//!
//! Схема восстанавливает прямоугольную рассадку: ряды нумеруются от 1 до
//! максимального номера, столбцы идут подряд по алфавиту от минимальной
//! до максимальной наблюдаемой буквы. Буквы без мест остаются в диапазоне
//! как промежутки: узкая заглушка для намеренно пропущенного столбца и
//! пустая ячейка полной ширины для столбца, в котором просто нет места
//! в данном ряду.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::models::{Room, Seat};

use super::{parse_skip_list, seat_position, SeatPosition, SeatingTheme};

/// Ячейка схемы.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GridCell {
    /// Место: код и цвет маркера по статусу.
    Seat {
        code: String,
        color: String,
        occupied: bool,
    },
    /// Столбец существует, но в этом ряду места нет. Полная ширина.
    Empty,
    /// Намеренно пропущенный столбец. Узкая заглушка.
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridRow {
    pub number: u32,
    pub cells: Vec<GridCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeatingGrid {
    pub room_code: String,
    pub column_range: Vec<char>,
    pub rows: Vec<GridRow>,
    // Метрики из темы, чтобы слою отрисовки не нужно было её знать.
    pub cell_width: u32,
    pub placeholder_width: u32,
    pub seat_spacing: u32,
    pub placeholder_spacing: u32,
    pub row_spacing: u32,
}

/// Результат построения: либо схема, либо заглушка для пустой комнаты.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SeatingLayout {
    NoSeats { message: String },
    Grid(SeatingGrid),
}

const NO_SEATS_MESSAGE: &str = "No seats available.";

/// Строит схему зала для комнаты.
///
/// Места с неразборчивой позицией не участвуют ни в наборе столбцов, ни в
/// подсчёте рядов и в схеме не отображаются. Комната без размещаемых мест
/// даёт NoSeats вместо схемы.
pub fn build_layout(room: &Room, seats: &[Seat], theme: &SeatingTheme) -> SeatingLayout {
    // Первое совпадение по позиции выигрывает, как и в исходных данных.
    let mut placed: HashMap<SeatPosition, &Seat> = HashMap::new();
    let mut letters_with_seats: HashSet<char> = HashSet::new();
    let mut max_column = 0u32;

    for seat in seats {
        let Some(pos) = seat_position(seat) else {
            continue;
        };
        letters_with_seats.insert(pos.row);
        max_column = max_column.max(pos.column);
        placed.entry(pos).or_insert(seat);
    }

    if placed.is_empty() {
        return SeatingLayout::NoSeats {
            message: NO_SEATS_MESSAGE.to_string(),
        };
    }

    let min_letter = *letters_with_seats.iter().min().unwrap();
    let max_letter = *letters_with_seats.iter().max().unwrap();
    let column_range: Vec<char> = (min_letter as u8..=max_letter as u8)
        .map(char::from)
        .collect();

    // Сохранённый при создании комнаты список пропусков авторитетен.
    // Для старых комнат без него пропуски выводятся из самих мест.
    let skip_list: Option<HashSet<char>> = room
        .skipped_columns
        .as_deref()
        .map(|raw| parse_skip_list(raw).into_iter().collect());

    let rows: Vec<GridRow> = (1..=max_column)
        .map(|number| {
            let cells = column_range
                .iter()
                .map(|&letter| {
                    let pos = SeatPosition {
                        row: letter,
                        column: number,
                    };
                    if let Some(seat) = placed.get(&pos) {
                        let occupied = seat.status != "Available";
                        GridCell::Seat {
                            code: seat.seat_code.clone(),
                            color: if occupied {
                                theme.occupied_color.clone()
                            } else {
                                theme.available_color.clone()
                            },
                            occupied,
                        }
                    } else {
                        let skipped = match &skip_list {
                            Some(skipped) => skipped.contains(&letter),
                            None => !letters_with_seats.contains(&letter),
                        };
                        if skipped {
                            GridCell::Placeholder
                        } else {
                            GridCell::Empty
                        }
                    }
                })
                .collect();
            GridRow { number, cells }
        })
        .collect();

    SeatingLayout::Grid(SeatingGrid {
        room_code: room.room_code.clone(),
        column_range,
        rows,
        cell_width: theme.cell_width(),
        placeholder_width: theme.placeholder_width(),
        seat_spacing: theme.seat_spacing,
        placeholder_spacing: theme.seat_spacing / 2,
        row_spacing: theme.row_spacing,
    })
}

/// Коды мест, позицию которых восстановить не удалось. Схема их молча
/// пропускает, а вызывающая сторона пишет предупреждение в лог.
pub fn unplaceable_codes(seats: &[Seat]) -> Vec<String> {
    seats
        .iter()
        .filter(|seat| seat_position(seat).is_none())
        .map(|seat| seat.seat_code.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn room(skipped: Option<&str>) -> Room {
        Room {
            id: 1,
            room_code: "ROOM-101".to_string(),
            staff_id: None,
            skipped_columns: skipped.map(str::to_string),
        }
    }

    fn seat(code: &str) -> Seat {
        Seat {
            id: 0,
            room_id: 1,
            seat_code: code.to_string(),
            row_letter: None,
            col_number: None,
            status: "Available".to_string(),
            student_id: None,
            exam_id: None,
        }
    }

    fn seats(codes: &[&str]) -> Vec<Seat> {
        codes.iter().map(|c| seat(c)).collect()
    }

    fn grid(layout: SeatingLayout) -> SeatingGrid {
        match layout {
            SeatingLayout::Grid(grid) => grid,
            SeatingLayout::NoSeats { .. } => panic!("expected a grid"),
        }
    }

    #[test]
    fn full_rectangle_is_fully_populated() {
        let layout = build_layout(
            &room(Some("")),
            &seats(&["A1", "A2", "B1", "B2"]),
            &SeatingTheme::default(),
        );
        let grid = grid(layout);

        assert_eq!(grid.column_range, vec!['A', 'B']);
        assert_eq!(
            grid.rows.iter().map(|r| r.number).collect::<Vec<_>>(),
            vec![1, 2]
        );
        for row in &grid.rows {
            assert_eq!(row.cells.len(), 2);
            for cell in &row.cells {
                assert!(matches!(cell, GridCell::Seat { .. }));
            }
        }
    }

    #[test]
    fn absent_letter_renders_as_full_empty_cell() {
        // B вообще без мест, но и не пропущен при создании
        let layout = build_layout(
            &room(Some("")),
            &seats(&["A1", "C1"]),
            &SeatingTheme::default(),
        );
        let grid = grid(layout);

        assert_eq!(grid.column_range, vec!['A', 'B', 'C']);
        for row in &grid.rows {
            assert_eq!(row.cells[1], GridCell::Empty);
        }
    }

    #[test]
    fn skipped_letter_renders_as_placeholder() {
        let layout = build_layout(
            &room(Some("B")),
            &seats(&["A1", "A2", "C1", "C2"]),
            &SeatingTheme::default(),
        );
        let grid = grid(layout);

        assert_eq!(grid.column_range, vec!['A', 'B', 'C']);
        for row in &grid.rows {
            assert_eq!(row.cells[1], GridCell::Placeholder);
        }
    }

    #[test]
    fn legacy_rooms_derive_skips_from_seat_data() {
        // skipped_columns не записан: буква без единого места считается
        // пропуском, как в исходном рендере
        let layout = build_layout(
            &room(None),
            &seats(&["A1", "C1"]),
            &SeatingTheme::default(),
        );
        let grid = grid(layout);
        for row in &grid.rows {
            assert_eq!(row.cells[1], GridCell::Placeholder);
        }
    }

    #[test]
    fn sparse_column_keeps_full_width() {
        // B имеет место во втором ряду, дыра в первом остаётся полной
        let layout = build_layout(
            &room(None),
            &seats(&["A1", "A2", "B2"]),
            &SeatingTheme::default(),
        );
        let grid = grid(layout);
        assert_eq!(grid.rows[0].cells[1], GridCell::Empty);
        assert!(matches!(grid.rows[1].cells[1], GridCell::Seat { .. }));
    }

    #[test]
    fn unparsable_seat_is_invisible_and_harmless() {
        let layout = build_layout(
            &room(Some("")),
            &seats(&["A1", "D"]),
            &SeatingTheme::default(),
        );
        let grid = grid(layout);

        // "D" не расширяет ни диапазон столбцов, ни количество рядов
        assert_eq!(grid.column_range, vec!['A']);
        assert_eq!(grid.rows.len(), 1);
        assert!(matches!(grid.rows[0].cells[0], GridCell::Seat { .. }));
    }

    #[test]
    fn only_unparsable_seats_mean_no_seats() {
        let layout = build_layout(&room(None), &seats(&["D", "X"]), &SeatingTheme::default());
        assert_eq!(
            layout,
            SeatingLayout::NoSeats {
                message: "No seats available.".to_string()
            }
        );
    }

    #[test]
    fn empty_room_renders_no_seats_placeholder() {
        let layout = build_layout(&room(None), &[], &SeatingTheme::default());
        assert_eq!(
            layout,
            SeatingLayout::NoSeats {
                message: "No seats available.".to_string()
            }
        );
    }

    #[test]
    fn rows_below_max_render_empty_not_collapsed() {
        let layout = build_layout(&room(Some("")), &seats(&["A3"]), &SeatingTheme::default());
        let grid = grid(layout);

        assert_eq!(grid.rows.len(), 3);
        assert_eq!(grid.rows[0].cells[0], GridCell::Empty);
        assert_eq!(grid.rows[1].cells[0], GridCell::Empty);
        assert!(matches!(grid.rows[2].cells[0], GridCell::Seat { .. }));
    }

    #[test]
    fn unknown_status_gets_occupied_color() {
        let theme = SeatingTheme::default();
        let mut one = seat("A1");
        one.status = "Reserved".to_string();
        let layout = build_layout(&room(Some("")), &[one], &theme);
        let grid = grid(layout);

        match &grid.rows[0].cells[0] {
            GridCell::Seat {
                color, occupied, ..
            } => {
                assert_eq!(color, &theme.occupied_color);
                assert!(occupied);
            }
            other => panic!("expected a seat cell, got {:?}", other),
        }
    }

    #[test]
    fn available_status_gets_available_color() {
        let theme = SeatingTheme::default();
        let layout = build_layout(&room(Some("")), &seats(&["A1"]), &theme);
        let grid = grid(layout);

        match &grid.rows[0].cells[0] {
            GridCell::Seat {
                color, occupied, ..
            } => {
                assert_eq!(color, &theme.available_color);
                assert!(!occupied);
            }
            other => panic!("expected a seat cell, got {:?}", other),
        }
    }

    #[test]
    fn first_matching_seat_wins_on_duplicates() {
        let mut first = seat("A1");
        first.status = "Occupied".to_string();
        let second = seat("A1");
        let layout = build_layout(&room(Some("")), &[first, second], &SeatingTheme::default());
        let grid = grid(layout);

        match &grid.rows[0].cells[0] {
            GridCell::Seat { occupied, .. } => assert!(occupied),
            other => panic!("expected a seat cell, got {:?}", other),
        }
    }

    #[test]
    fn explicit_position_places_seat_regardless_of_code() {
        let mut odd = seat("Z9");
        odd.row_letter = Some("B".to_string());
        odd.col_number = Some(1);
        let mut all = seats(&["A1"]);
        all.push(odd);

        let layout = build_layout(&room(Some("")), &all, &SeatingTheme::default());
        let grid = grid(layout);

        assert_eq!(grid.column_range, vec!['A', 'B']);
        match &grid.rows[0].cells[1] {
            GridCell::Seat { code, .. } => assert_eq!(code, "Z9"),
            other => panic!("expected a seat cell, got {:?}", other),
        }
    }

    #[test]
    fn collects_unplaceable_codes() {
        assert_eq!(
            unplaceable_codes(&seats(&["A1", "D", "B2", "X"])),
            vec!["D".to_string(), "X".to_string()]
        );
    }

    proptest! {
        // Построение детерминировано и не падает на любом входе.
        #[test]
        fn layout_is_deterministic(
            codes in proptest::collection::vec("[A-Z]{0,2}[0-9]{0,3}", 0..40),
            skipped in proptest::option::of("[A-Z](,[A-Z]){0,3}"),
        ) {
            let room = Room {
                id: 1,
                room_code: "ROOM-1".to_string(),
                staff_id: None,
                skipped_columns: skipped,
            };
            let seats: Vec<Seat> = codes.iter().map(|c| seat(c)).collect();
            let theme = SeatingTheme::default();

            let first = build_layout(&room, &seats, &theme);
            let second = build_layout(&room, &seats, &theme);
            prop_assert_eq!(first, second);
        }
    }
}
