// HugeTriangles
// copyright hugetriangles 2026

//! HugeTriangles is a minimal "hello triangle" OpenGL program: it opens a
//! window with a 3.3 core context, builds one shader program from a fixed
//! vertex/fragment pair through the [`program::GlslProgram`] wrapper, uploads
//! two hardcoded triangles and renders them each frame until the window
//! closes or Escape is pressed.
//!
//! The windowing stack is winit + glutin, GL calls go through glow.
//!
//! Modules: `program` holds the shader-program wrapper (the only component
//! with a real contract), `app` the window/context/frame-loop glue, `log`
//! the log4rs setup.

pub mod app;
pub mod log;
pub mod program;

pub use program::{GlslProgram, ProgramError, ProgramResult, ShaderStage};
