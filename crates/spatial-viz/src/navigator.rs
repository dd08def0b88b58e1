//! BSP tree navigation utilities for interactive visualization.

use macroquad::prelude::*;
use spatial_tree::{Bsp, BspNode, Primitive};

use crate::{draw_aabb_solid, draw_aabb_wires, draw_bsp_cell};

/// Direction taken at each node in the navigation path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// Interactive BSP tree navigator for exploring tree structure.
pub struct TreeNavigator {
    path: Vec<Direction>,
}

impl Default for TreeNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeNavigator {
    /// Creates a new navigator starting at the root.
    pub fn new() -> Self {
        Self { path: Vec::new() }
    }

    pub fn path(&self) -> &[Direction] {
        &self.path
    }

    /// Returns the current depth in the tree.
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Attempts to navigate to the left child. Returns true if successful.
    pub fn go_left<P, S>(&mut self, tree: &Bsp<P, S>) -> bool {
        self.go(tree, Direction::Left)
    }

    /// Attempts to navigate to the right child. Returns true if successful.
    pub fn go_right<P, S>(&mut self, tree: &Bsp<P, S>) -> bool {
        self.go(tree, Direction::Right)
    }

    /// Navigates to the parent node. Returns true if not already at root.
    pub fn go_parent(&mut self) -> bool {
        self.path.pop().is_some()
    }

    /// Returns to the root node.
    pub fn go_root(&mut self) {
        self.path.clear();
    }

    fn go<P, S>(&mut self, tree: &Bsp<P, S>, direction: Direction) -> bool {
        let child = self.current_node(tree).and_then(|node| match direction {
            Direction::Left => node.left(),
            Direction::Right => node.right(),
        });
        if child.is_some() {
            self.path.push(direction);
        }
        child.is_some()
    }

    /// Handles keyboard input for navigation.
    /// Returns true if navigation state changed.
    pub fn update<P, S>(&mut self, tree: &Bsp<P, S>) -> bool {
        let mut changed = false;

        if is_key_pressed(KeyCode::L) {
            changed = self.go_left(tree);
        }
        if is_key_pressed(KeyCode::R) {
            changed = self.go_right(tree);
        }
        if is_key_pressed(KeyCode::P) {
            changed = self.go_parent();
        }
        if is_key_pressed(KeyCode::T) && !self.path.is_empty() {
            self.go_root();
            changed = true;
        }

        changed
    }

    /// Returns a reference to the current node, if the tree is non-empty.
    pub fn current_node<'a, P, S>(&self, tree: &'a Bsp<P, S>) -> Option<&'a BspNode<P>> {
        tree.root().and_then(|root| get_node_at_path(root, &self.path))
    }

    /// Renders the cells of the current subtree and the primitives stored in it.
    ///
    /// Primitives kept at the current node itself are drawn solid, the rest
    /// of the subtree as wireframes.
    pub fn render<P: Primitive, S>(&self, tree: &Bsp<P, S>, primitive_color: Color) {
        let Some(node) = self.current_node(tree) else {
            return;
        };

        render_subtree(node, primitive_color);
        for primitive in node.primitives() {
            draw_aabb_solid(&primitive.world_aabb(), primitive_color);
        }
    }

    /// Draws the navigation UI overlay.
    pub fn draw_ui<P, S>(&self, tree: &Bsp<P, S>, y_offset: f32) {
        let Some(node) = self.current_node(tree) else {
            draw_text("Empty tree", 10.0, y_offset, 18.0, WHITE);
            return;
        };

        let path_str = if self.path.is_empty() {
            "root".to_string()
        } else {
            self.path
                .iter()
                .map(|d| match d {
                    Direction::Left => "L",
                    Direction::Right => "R",
                })
                .collect::<Vec<_>>()
                .join(" -> ")
        };

        draw_text(
            &format!(
                "{:?} | kept here: {} | subtree: {} primitives",
                node.node_type(),
                node.primitives().len(),
                node.primitive_count()
            ),
            10.0,
            y_offset,
            18.0,
            WHITE,
        );
        draw_text(
            &format!(
                "Path: {} (depth {}) | split: {}",
                path_str,
                self.path.len(),
                node.split_plane()
                    .map_or("none".to_string(), |plane| format!("{plane:?}"))
            ),
            10.0,
            y_offset + 20.0,
            18.0,
            YELLOW,
        );
        draw_text(
            &format!(
                "Children: {}{}{}",
                if node.left().is_some() { "[L]eft " } else { "" },
                if node.right().is_some() { "[R]ight " } else { "" },
                if node.is_leaf() { "(leaf)" } else { "" }
            ),
            10.0,
            y_offset + 40.0,
            18.0,
            if node.is_leaf() { ORANGE } else { GREEN },
        );
        draw_text("[P]arent | [T]op", 10.0, y_offset + 60.0, 16.0, DARKGRAY);
    }
}

/// Navigates to a node following the path, returns None if path is invalid.
fn get_node_at_path<'a, P>(root: &'a BspNode<P>, path: &[Direction]) -> Option<&'a BspNode<P>> {
    let mut current = root;
    for dir in path {
        current = match dir {
            Direction::Left => current.left()?,
            Direction::Right => current.right()?,
        };
    }
    Some(current)
}

fn render_subtree<P: Primitive>(node: &BspNode<P>, primitive_color: Color) {
    draw_bsp_cell(node);
    for child in [node.left(), node.right()].into_iter().flatten() {
        for primitive in child.primitives() {
            draw_aabb_wires(&primitive.world_aabb(), primitive_color);
        }
        render_subtree(child, primitive_color);
    }
}
