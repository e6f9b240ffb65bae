// HugeTriangles
// copyright hugetriangles 2026

//! Application driver: window + OpenGL context via winit/glutin, one shader
//! program built through [`GlslProgram`], two static triangle buffers, and a
//! clear→draw→swap frame loop. Runs until the window closes or Escape is
//! pressed.

use crate::program::{GlslProgram, ProgramResult};

use glow::HasContext;
use glutin::{
    config::{ConfigTemplateBuilder, GlConfig},
    context::{
        ContextApi, ContextAttributesBuilder, NotCurrentGlContext, PossiblyCurrentContext, Version,
    },
    display::{GetGlDisplay, GlDisplay},
    prelude::GlSurface,
    surface::{Surface, SurfaceAttributesBuilder, WindowSurface},
};
use glutin_winit::DisplayBuilder;
use log::{error, info};
use std::num::NonZeroU32;
use std::path::Path;
use std::sync::Arc;
use winit::raw_window_handle::HasWindowHandle;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

const SCR_WIDTH: u32 = 800;
const SCR_HEIGHT: u32 = 600;
const WINDOW_TITLE: &str = "Huge triangles";

const VERT_SHADER_PATH: &str = "assets/shaders/triangle.vert";
const FRAG_SHADER_PATH: &str = "assets/shaders/triangle.frag";

// Interleaved position (vec3) + color (vec3), one triangle each.
const FIRST_TRIANGLE: [f32; 18] = [
    -0.5, -0.5, 1.0, //
    1.0, 0.0, 0.0, // color
    0.5, -0.5, 0.0, //
    0.0, 1.0, 0.0, // color
    -0.5, 0.5, 1.0, //
    0.0, 0.0, 1.0, // color
];

const SECOND_TRIANGLE: [f32; 18] = [
    -0.5, 0.5, 1.0, //
    0.0, 0.0, 1.0, // color
    0.5, 0.5, 0.0, //
    1.0, 0.0, 0.0, // color
    0.5, -0.5, 1.0, //
    0.0, 1.0, 0.0, // color
];

/// Create the event loop and run the demo until close or Escape.
///
/// Window and context creation failures are fatal here; only the shader
/// build path reports through `ProgramError`.
pub fn run() {
    let event_loop = EventLoop::new().expect("can't create the event loop");

    let mut app = TriangleApp::new();
    event_loop.run_app(&mut app).expect("event loop failed");
}

pub struct TriangleApp {
    window: Option<Arc<Window>>,
    gl_context: Option<PossiblyCurrentContext>,
    gl_surface: Option<Surface<WindowSurface>>,
    gl: Option<glow::Context>,
    program: Option<GlslProgram>,
    vaos: Vec<glow::VertexArray>,
    vbos: Vec<glow::Buffer>,
}

impl TriangleApp {
    pub fn new() -> Self {
        Self {
            window: None,
            gl_context: None,
            gl_surface: None,
            gl: None,
            program: None,
            vaos: Vec::new(),
            vbos: Vec::new(),
        }
    }

    fn redraw(&mut self) {
        let (Some(gl), Some(gl_surface), Some(gl_context), Some(window)) =
            (&self.gl, &self.gl_surface, &self.gl_context, &self.window)
        else {
            return;
        };

        unsafe {
            gl.clear_color(0.2, 0.3, 0.3, 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT);

            for vao in &self.vaos {
                gl.bind_vertex_array(Some(*vao));
                gl.draw_arrays(glow::TRIANGLES, 0, 3);
            }
        }

        if let Err(e) = gl_surface.swap_buffers(gl_context) {
            eprintln!("Failed to swap buffers: {:?}", e);
        }
        window.request_redraw();
    }

    fn resize(&mut self, width: u32, height: u32) {
        let (Some(width), Some(height)) = (NonZeroU32::new(width), NonZeroU32::new(height)) else {
            return;
        };
        if let (Some(gl), Some(gl_surface), Some(gl_context)) =
            (&self.gl, &self.gl_surface, &self.gl_context)
        {
            gl_surface.resize(gl_context, width, height);
            unsafe {
                gl.viewport(0, 0, width.get() as i32, height.get() as i32);
            }
        }
    }
}

impl Default for TriangleApp {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationHandler for TriangleApp {
    /// Window, GL context and all rendering resources are created here, in
    /// the first resumed event.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        info!("Creating OpenGL window and context...");

        let window_size = LogicalSize::new(SCR_WIDTH, SCR_HEIGHT);
        let template = ConfigTemplateBuilder::new();
        let display_builder = DisplayBuilder::new().with_window_attributes(Some(
            Window::default_attributes()
                .with_title(WINDOW_TITLE)
                .with_inner_size(window_size),
        ));

        let (window, gl_config) = display_builder
            .build(event_loop, template, |configs| {
                configs
                    .reduce(|accum, config| {
                        if config.num_samples() > accum.num_samples() {
                            config
                        } else {
                            accum
                        }
                    })
                    .unwrap()
            })
            .unwrap();

        let window = Arc::new(window.unwrap());
        let physical_size = window.inner_size();

        let gl_display = gl_config.display();
        let raw_window_handle = window.window_handle().unwrap().as_raw();

        let context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .build(Some(raw_window_handle));

        let not_current_gl_context = unsafe {
            gl_display
                .create_context(&gl_config, &context_attributes)
                .expect("failed to create context")
        };

        let gl_surface = unsafe {
            let attrs = SurfaceAttributesBuilder::<WindowSurface>::new().build(
                raw_window_handle,
                NonZeroU32::new(physical_size.width).unwrap(),
                NonZeroU32::new(physical_size.height).unwrap(),
            );
            gl_display
                .create_window_surface(&gl_config, &attrs)
                .unwrap()
        };

        let gl_context = not_current_gl_context.make_current(&gl_surface).unwrap();

        let gl = unsafe {
            glow::Context::from_loader_function(|s| {
                let s = std::ffi::CString::new(s)
                    .expect("failed to construct C string from string for gl proc address");
                gl_display.get_proc_address(&s)
            })
        };

        info!(
            "OpenGL window & context ready - logical: {}x{}, physical: {}x{}",
            SCR_WIDTH, SCR_HEIGHT, physical_size.width, physical_size.height
        );

        // A failed shader build is fatal: rendering with a half-built
        // program would only clear the screen every frame.
        match build_program(&gl) {
            Ok(program) => self.program = Some(program),
            Err(e) => {
                error!("shader setup failed: {}", e);
                event_loop.exit();
                return;
            }
        }

        for vertices in [&FIRST_TRIANGLE, &SECOND_TRIANGLE] {
            let (vao, vbo) = upload_triangle(&gl, vertices);
            self.vaos.push(vao);
            self.vbos.push(vbo);
        }

        self.gl = Some(gl);
        self.gl_context = Some(gl_context);
        self.gl_surface = Some(gl_surface);
        self.window = Some(window.clone());

        window.request_redraw();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event: key_event, ..
            } => {
                if key_event.state == ElementState::Pressed {
                    if let PhysicalKey::Code(KeyCode::Escape) = key_event.physical_key {
                        event_loop.exit();
                    }
                }
            }
            WindowEvent::Resized(size) => {
                self.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gl) = &self.gl {
            if let Some(program) = &mut self.program {
                program.destroy(gl);
            }
            unsafe {
                for vao in self.vaos.drain(..) {
                    gl.delete_vertex_array(vao);
                }
                for vbo in self.vbos.drain(..) {
                    gl.delete_buffer(vbo);
                }
            }
        }
        info!("exiting");
    }
}

/// Compile the fixed vertex/fragment pair, link and bind the program.
/// Stages are inferred from the file extensions.
fn build_program(gl: &glow::Context) -> ProgramResult<GlslProgram> {
    let mut program = GlslProgram::new(gl)?;
    program.compile_file(gl, Path::new(VERT_SHADER_PATH))?;
    program.compile_file(gl, Path::new(FRAG_SHADER_PATH))?;
    program.link(gl)?;
    program.bind(gl)?;

    program.find_uniform_locations(gl);
    program.log_active_attributes(gl);
    program.log_active_uniforms(gl);

    Ok(program)
}

/// Upload one triangle into its own VAO/VBO pair.
/// Attribute 0: vec3 position, attribute 1: vec3 color, stride 24 bytes.
fn upload_triangle(gl: &glow::Context, vertices: &[f32; 18]) -> (glow::VertexArray, glow::Buffer) {
    unsafe {
        let vao = gl.create_vertex_array().unwrap();
        gl.bind_vertex_array(Some(vao));

        let vbo = gl.create_buffer().unwrap();
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gl.buffer_data_u8_slice(
            glow::ARRAY_BUFFER,
            bytemuck::cast_slice(vertices),
            glow::STATIC_DRAW,
        );

        let stride = (6 * std::mem::size_of::<f32>()) as i32;
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);
        gl.enable_vertex_attrib_array(1);
        gl.vertex_attrib_pointer_f32(1, 3, glow::FLOAT, false, stride, 12);

        gl.bind_vertex_array(None);
        (vao, vbo)
    }
}
