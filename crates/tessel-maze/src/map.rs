use std::fmt;

use crate::contract::{MazeRenderer, MazeVertex, QuadListData};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Cell {
    Wall,
    Floor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MazeMapError {
    Empty,
    RaggedRow { row: usize, expected: usize, actual: usize },
    UnknownCell { row: usize, col: usize, ch: char },
    MissingStart,
}

impl fmt::Display for MazeMapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MazeMapError::Empty => write!(f, "maze map is empty"),
            MazeMapError::RaggedRow { row, expected, actual } => {
                write!(f, "maze row {row} has {actual} cells, expected {expected}")
            }
            MazeMapError::UnknownCell { row, col, ch } => {
                write!(f, "unknown maze cell {ch:?} at row {row}, col {col}")
            }
            MazeMapError::MissingStart => write!(f, "maze map has no start cell 'S'"),
        }
    }
}

impl std::error::Error for MazeMapError {}

/// Grid of walls and floors.
///
/// Text form: `#` wall, `.` or space floor, `S` floor where the player starts.
#[derive(Debug, Clone, PartialEq)]
pub struct MazeMap {
    cols: usize,
    rows: usize,
    cells: Vec<Cell>,
    start: (usize, usize),
}

impl MazeMap {
    pub fn parse(lines: &[&str]) -> Result<Self, MazeMapError> {
        let cols = lines.first().map(|l| l.chars().count()).unwrap_or(0);
        if cols == 0 {
            return Err(MazeMapError::Empty);
        }

        let mut cells = Vec::with_capacity(cols * lines.len());
        let mut start = None;

        for (row, line) in lines.iter().enumerate() {
            let actual = line.chars().count();
            if actual != cols {
                return Err(MazeMapError::RaggedRow { row, expected: cols, actual });
            }
            for (col, ch) in line.chars().enumerate() {
                let cell = match ch {
                    '#' => Cell::Wall,
                    '.' | ' ' => Cell::Floor,
                    'S' => {
                        start = Some((col, row));
                        Cell::Floor
                    }
                    _ => return Err(MazeMapError::UnknownCell { row, col, ch }),
                };
                cells.push(cell);
            }
        }

        Ok(Self {
            cols,
            rows: lines.len(),
            cells,
            start: start.ok_or(MazeMapError::MissingStart)?,
        })
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// `(col, row)` of the start cell.
    pub fn start(&self) -> (usize, usize) {
        self.start
    }

    /// Outside the grid counts as wall.
    pub fn cell(&self, col: isize, row: isize) -> Cell {
        if col < 0 || row < 0 || col as usize >= self.cols || row as usize >= self.rows {
            return Cell::Wall;
        }
        self.cells[row as usize * self.cols + col as usize]
    }

    pub fn is_open(&self, col: isize, row: isize) -> bool {
        self.cell(col, row) == Cell::Floor
    }
}

/// Raw texture ids per face kind; 0 leaves the current binding in place.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct MazeTextures {
    pub wall: u32,
    pub floor: u32,
    pub ceiling: u32,
}

/// Viewer position in map cells plus a heading; 0° looks toward row 0.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MazeCamera {
    pub col: f32,
    pub row: f32,
    pub heading_deg: f32,
}

impl MazeCamera {
    /// Centered on a cell.
    pub fn at_cell((col, row): (usize, usize), heading_deg: f32) -> Self {
        Self {
            col: col as f32 + 0.5,
            row: row as f32 + 0.5,
            heading_deg,
        }
    }
}

/// Turns a [`MazeMap`] into compiled quad lists and replays them.
///
/// Square `(col, row)` spans `x = col*size..(col+1)*size` and
/// `z = row*size..(row+1)*size`; floor and ceiling heights are on the y axis.
#[derive(Debug)]
pub struct MazeScene {
    map: MazeMap,
    square_size: f32,
    floor_y: f32,
    ceiling_y: f32,
    textures: MazeTextures,
    lists: Option<(u32, usize)>,
}

impl MazeScene {
    pub fn new(map: MazeMap, square_size: f32, floor_y: f32, ceiling_y: f32) -> Self {
        Self {
            map,
            square_size,
            floor_y,
            ceiling_y,
            textures: MazeTextures::default(),
            lists: None,
        }
    }

    pub fn with_textures(mut self, textures: MazeTextures) -> Self {
        self.textures = textures;
        self
    }

    pub fn map(&self) -> &MazeMap {
        &self.map
    }

    /// Number of compiled faces, 0 before [`MazeScene::build`].
    pub fn face_count(&self) -> usize {
        self.lists.map_or(0, |(_, count)| count)
    }

    /// (Re)generates every face. Existing lists are released first.
    pub fn build(&mut self, renderer: &mut impl MazeRenderer) {
        self.release(renderer);

        let faces = self.faces();
        let handle = renderer.gen_quad_lists(faces.len());
        if handle == 0 {
            log::error!("maze: no quad list handle for {} faces", faces.len());
            return;
        }
        for (index, face) in faces.iter().enumerate() {
            renderer.compile_quad_list(handle, index, face);
        }
        log::debug!(
            "maze: compiled {} faces for a {}x{} map",
            faces.len(),
            self.map.cols,
            self.map.rows
        );
        self.lists = Some((handle, faces.len()));
    }

    pub fn draw(&self, renderer: &mut impl MazeRenderer, camera: &MazeCamera) {
        let Some((handle, count)) = self.lists else {
            return;
        };

        let eye_y = (self.floor_y + self.ceiling_y) * 0.5;

        renderer.begin_draw();
        renderer.push_model_matrix();
        renderer.rotate_model_matrix(-camera.heading_deg, 0.0, 1.0, 0.0);
        renderer.translate_model_matrix(
            -camera.col * self.square_size,
            -eye_y,
            -camera.row * self.square_size,
        );
        renderer.update_model_matrix();
        for index in 0..count {
            renderer.draw_quad_list(handle, index);
        }
        renderer.pop_model_matrix();
        renderer.end_draw();
    }

    pub fn release(&mut self, renderer: &mut impl MazeRenderer) {
        if let Some((handle, count)) = self.lists.take() {
            renderer.delete_quad_lists(handle, count);
        }
    }

    fn faces(&self) -> Vec<QuadListData> {
        let mut faces = Vec::new();
        let (f, c, s) = (self.floor_y, self.ceiling_y, self.square_size);

        for row in 0..self.map.rows as isize {
            for col in 0..self.map.cols as isize {
                if !self.map.is_open(col, row) {
                    continue;
                }

                let (x0, z0) = (col as f32 * s, row as f32 * s);
                let (x1, z1) = (x0 + s, z0 + s);
                let v = MazeVertex::new;

                faces.push(QuadListData {
                    texture_id: self.textures.floor,
                    normal: v(0.0, 1.0, 0.0),
                    vertices: [v(x0, f, z0), v(x1, f, z0), v(x1, f, z1), v(x0, f, z1)],
                });
                faces.push(QuadListData {
                    texture_id: self.textures.ceiling,
                    normal: v(0.0, -1.0, 0.0),
                    vertices: [v(x0, c, z1), v(x1, c, z1), v(x1, c, z0), v(x0, c, z0)],
                });

                let wall = |normal: MazeVertex, vertices: [MazeVertex; 4]| QuadListData {
                    texture_id: self.textures.wall,
                    normal,
                    vertices,
                };
                if !self.map.is_open(col, row - 1) {
                    faces.push(wall(
                        v(0.0, 0.0, 1.0),
                        [v(x0, c, z0), v(x1, c, z0), v(x1, f, z0), v(x0, f, z0)],
                    ));
                }
                if !self.map.is_open(col, row + 1) {
                    faces.push(wall(
                        v(0.0, 0.0, -1.0),
                        [v(x1, c, z1), v(x0, c, z1), v(x0, f, z1), v(x1, f, z1)],
                    ));
                }
                if !self.map.is_open(col - 1, row) {
                    faces.push(wall(
                        v(1.0, 0.0, 0.0),
                        [v(x0, c, z1), v(x0, c, z0), v(x0, f, z0), v(x0, f, z1)],
                    ));
                }
                if !self.map.is_open(col + 1, row) {
                    faces.push(wall(
                        v(-1.0, 0.0, 0.0),
                        [v(x1, c, z0), v(x1, c, z1), v(x1, f, z1), v(x1, f, z0)],
                    ));
                }
            }
        }
        faces
    }
}
