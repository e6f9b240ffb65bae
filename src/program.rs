// HugeTriangles
// copyright hugetriangles 2026

//! GLSL program wrapper over glow.
//!
//! `GlslProgram` owns one program handle plus a fixed table of shader-stage
//! handles, compiles source per stage, links, binds and sets uniforms through
//! a name→location cache. It never owns the `glow::Context`; every call
//! borrows it, so the wrapper stays usable from whatever object holds the
//! context (see `app.rs`).

use glow::HasContext;
use log::info;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Program wrapper result type
pub type ProgramResult<T> = Result<T, ProgramError>;

/// Everything that can go wrong while building or using a program
#[derive(Debug)]
pub enum ProgramError {
    /// Program or shader object allocation failed
    CreateFailed(String),
    /// Raw shader-stage value is not one of the six recognized stages
    InvalidStage(u32),
    /// Shader source file could not be opened
    FileNotFound(String),
    /// Stage compilation failed, message carries the driver log
    CompileFailed(String),
    /// Program linking failed, message carries the driver log
    LinkFailed(String),
    /// Program used before a successful link
    NotLinked,
    /// Shader file has no extension or an unrecognized one
    UnknownExtension(String),
}

impl std::fmt::Display for ProgramError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgramError::CreateFailed(msg) => write!(f, "Can't create {}", msg),
            ProgramError::InvalidStage(raw) => {
                write!(f, "Invalid shader stage value: 0x{:04x}", raw)
            }
            ProgramError::FileNotFound(path) => write!(f, "Can't open the file {}", path),
            ProgramError::CompileFailed(msg) => write!(f, "{}", msg),
            ProgramError::LinkFailed(msg) => write!(f, "{}", msg),
            ProgramError::NotLinked => write!(f, "Program was not linked"),
            ProgramError::UnknownExtension(path) => {
                write!(f, "Unrecognized shader file extension: {}", path)
            }
        }
    }
}

impl std::error::Error for ProgramError {}

/// One pipeline phase of a shading program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Geometry,
    TessControl,
    TessEvaluation,
    Compute,
}

impl ShaderStage {
    pub const COUNT: usize = 6;

    pub const ALL: [ShaderStage; Self::COUNT] = [
        ShaderStage::Vertex,
        ShaderStage::Fragment,
        ShaderStage::Geometry,
        ShaderStage::TessControl,
        ShaderStage::TessEvaluation,
        ShaderStage::Compute,
    ];

    /// Map to the GL shader-type enum
    pub fn to_gl(self) -> u32 {
        match self {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
            ShaderStage::Geometry => glow::GEOMETRY_SHADER,
            ShaderStage::TessControl => glow::TESS_CONTROL_SHADER,
            ShaderStage::TessEvaluation => glow::TESS_EVALUATION_SHADER,
            ShaderStage::Compute => glow::COMPUTE_SHADER,
        }
    }

    /// Resolve a raw GL shader-type value, rejecting anything outside the
    /// six recognized stages
    pub fn from_gl(raw: u32) -> ProgramResult<Self> {
        match raw {
            glow::VERTEX_SHADER => Ok(ShaderStage::Vertex),
            glow::FRAGMENT_SHADER => Ok(ShaderStage::Fragment),
            glow::GEOMETRY_SHADER => Ok(ShaderStage::Geometry),
            glow::TESS_CONTROL_SHADER => Ok(ShaderStage::TessControl),
            glow::TESS_EVALUATION_SHADER => Ok(ShaderStage::TessEvaluation),
            glow::COMPUTE_SHADER => Ok(ShaderStage::Compute),
            _ => Err(ProgramError::InvalidStage(raw)),
        }
    }

    /// Infer the stage from a shader file's extension
    pub fn from_path(path: &Path) -> ProgramResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ProgramError::UnknownExtension(path.display().to_string()))?;
        match ext {
            "vs" | "vert" => Ok(ShaderStage::Vertex),
            "fs" | "frag" => Ok(ShaderStage::Fragment),
            "gs" | "geom" => Ok(ShaderStage::Geometry),
            "tcs" => Ok(ShaderStage::TessControl),
            "tes" => Ok(ShaderStage::TessEvaluation),
            "cs" => Ok(ShaderStage::Compute),
            _ => Err(ProgramError::UnknownExtension(path.display().to_string())),
        }
    }

    /// Slot in the stage-handle table
    fn index(self) -> usize {
        match self {
            ShaderStage::Vertex => 0,
            ShaderStage::Fragment => 1,
            ShaderStage::Geometry => 2,
            ShaderStage::TessControl => 3,
            ShaderStage::TessEvaluation => 4,
            ShaderStage::Compute => 5,
        }
    }

    fn tag(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "VERTEX",
            ShaderStage::Fragment => "FRAGMENT",
            ShaderStage::Geometry => "GEOMETRY",
            ShaderStage::TessControl => "TESS_CONTROL",
            ShaderStage::TessEvaluation => "TESS_EVALUATION",
            ShaderStage::Compute => "COMPUTE",
        }
    }
}

fn compile_error_message(label: &str, stage: ShaderStage, driver_log: &str) -> String {
    format!(
        "{}\nERROR::SHADER::{}::COMPILATION_FAILED\n{}",
        label,
        stage.tag(),
        driver_log
    )
}

fn link_error_message(driver_log: &str) -> String {
    format!("ERROR::SHADER::PROGRAM::LINKING_FAILED\n{}", driver_log)
}

/// A GL program plus the shader stages attached to it.
///
/// Lifecycle: Created → (stages compiled)* → Linked → bindable. `bind` before
/// a successful `link` fails with `NotLinked`. `destroy` releases every
/// stage handle and the program handle; it is idempotent and must be called
/// while the GL context is still current.
pub struct GlslProgram {
    program: glow::Program,
    stages: [Option<glow::Shader>; ShaderStage::COUNT],
    linked: bool,
    destroyed: bool,
    uniform_locations: HashMap<String, Option<glow::UniformLocation>>,
}

impl GlslProgram {
    pub fn new(gl: &glow::Context) -> ProgramResult<Self> {
        let program = unsafe {
            gl.create_program()
                .map_err(|e| ProgramError::CreateFailed(format!("a program: {}", e)))?
        };
        Ok(Self {
            program,
            stages: [None; ShaderStage::COUNT],
            linked: false,
            destroyed: false,
            uniform_locations: HashMap::new(),
        })
    }

    /// Compile `source` for `stage` and attach it to the program. `label`
    /// names the source in error messages (typically the file path).
    pub fn compile_source(
        &mut self,
        gl: &glow::Context,
        source: &str,
        stage: ShaderStage,
        label: &str,
    ) -> ProgramResult<()> {
        unsafe {
            let shader = gl.create_shader(stage.to_gl()).map_err(|e| {
                ProgramError::CreateFailed(format!("a shader for {}: {}", label, e))
            })?;

            gl.shader_source(shader, source);
            gl.compile_shader(shader);
            if !gl.get_shader_compile_status(shader) {
                let log = gl.get_shader_info_log(shader);
                gl.delete_shader(shader);
                return Err(ProgramError::CompileFailed(compile_error_message(
                    label, stage, &log,
                )));
            }

            gl.attach_shader(self.program, shader);

            // Recompiling a stage replaces the previous handle.
            if let Some(old) = self.stages[stage.index()].replace(shader) {
                gl.detach_shader(self.program, old);
                gl.delete_shader(old);
            }
        }
        Ok(())
    }

    /// Like `compile_source` but the stage arrives as a raw GL enum value
    pub fn compile_raw(
        &mut self,
        gl: &glow::Context,
        source: &str,
        raw_stage: u32,
        label: &str,
    ) -> ProgramResult<()> {
        let stage = ShaderStage::from_gl(raw_stage)?;
        self.compile_source(gl, source, stage, label)
    }

    /// Read a shader file and compile it for an explicit stage
    pub fn compile_file_as(
        &mut self,
        gl: &glow::Context,
        path: &Path,
        stage: ShaderStage,
    ) -> ProgramResult<()> {
        let source = fs::read_to_string(path)
            .map_err(|_| ProgramError::FileNotFound(path.display().to_string()))?;
        self.compile_source(gl, &source, stage, &path.display().to_string())
    }

    /// Read a shader file and infer its stage from the extension
    pub fn compile_file(&mut self, gl: &glow::Context, path: &Path) -> ProgramResult<()> {
        let stage = ShaderStage::from_path(path)?;
        self.compile_file_as(gl, path, stage)
    }

    /// Link all attached stages. Stage handles stay attached; they are
    /// released together with the program in `destroy`.
    pub fn link(&mut self, gl: &glow::Context) -> ProgramResult<()> {
        unsafe {
            gl.link_program(self.program);
            if !gl.get_program_link_status(self.program) {
                let log = gl.get_program_info_log(self.program);
                return Err(ProgramError::LinkFailed(link_error_message(&log)));
            }
        }
        self.linked = true;
        Ok(())
    }

    /// Make this program the current rendering program
    pub fn bind(&self, gl: &glow::Context) -> ProgramResult<()> {
        if !self.linked || self.destroyed {
            return Err(ProgramError::NotLinked);
        }
        unsafe {
            gl.use_program(Some(self.program));
        }
        Ok(())
    }

    pub fn is_linked(&self) -> bool {
        self.linked
    }

    pub fn handle(&self) -> glow::Program {
        self.program
    }

    /// Fix an attribute location; only meaningful before `link`
    pub fn bind_attrib_location(&self, gl: &glow::Context, location: u32, name: &str) {
        unsafe {
            gl.bind_attrib_location(self.program, location, name);
        }
    }

    /// Fix a fragment output location; only meaningful before `link`
    pub fn bind_frag_data_location(&self, gl: &glow::Context, location: u32, name: &str) {
        unsafe {
            gl.bind_frag_data_location(self.program, location, name);
        }
    }

    fn uniform_location(
        &mut self,
        gl: &glow::Context,
        name: &str,
    ) -> Option<glow::UniformLocation> {
        if let Some(cached) = self.uniform_locations.get(name) {
            return cached.clone();
        }
        let location = unsafe { gl.get_uniform_location(self.program, name) };
        self.uniform_locations
            .insert(name.to_string(), location.clone());
        location
    }

    // Uniform setters silently ignore names that do not resolve, matching
    // GL's own tolerance of a -1 location.

    pub fn set_uniform_f32(&mut self, gl: &glow::Context, name: &str, v: f32) {
        if let Some(loc) = self.uniform_location(gl, name) {
            unsafe { gl.uniform_1_f32(Some(&loc), v) };
        }
    }

    pub fn set_uniform_i32(&mut self, gl: &glow::Context, name: &str, v: i32) {
        if let Some(loc) = self.uniform_location(gl, name) {
            unsafe { gl.uniform_1_i32(Some(&loc), v) };
        }
    }

    pub fn set_uniform_u32(&mut self, gl: &glow::Context, name: &str, v: u32) {
        if let Some(loc) = self.uniform_location(gl, name) {
            unsafe { gl.uniform_1_u32(Some(&loc), v) };
        }
    }

    pub fn set_uniform_bool(&mut self, gl: &glow::Context, name: &str, v: bool) {
        self.set_uniform_i32(gl, name, v as i32);
    }

    pub fn set_uniform_vec2(&mut self, gl: &glow::Context, name: &str, v: [f32; 2]) {
        if let Some(loc) = self.uniform_location(gl, name) {
            unsafe { gl.uniform_2_f32(Some(&loc), v[0], v[1]) };
        }
    }

    pub fn set_uniform_vec3(&mut self, gl: &glow::Context, name: &str, v: [f32; 3]) {
        if let Some(loc) = self.uniform_location(gl, name) {
            unsafe { gl.uniform_3_f32(Some(&loc), v[0], v[1], v[2]) };
        }
    }

    pub fn set_uniform_vec4(&mut self, gl: &glow::Context, name: &str, v: [f32; 4]) {
        if let Some(loc) = self.uniform_location(gl, name) {
            unsafe { gl.uniform_4_f32(Some(&loc), v[0], v[1], v[2], v[3]) };
        }
    }

    pub fn set_uniform_mat3(&mut self, gl: &glow::Context, name: &str, m: &[f32; 9]) {
        if let Some(loc) = self.uniform_location(gl, name) {
            unsafe { gl.uniform_matrix_3_f32_slice(Some(&loc), false, m) };
        }
    }

    pub fn set_uniform_mat4(&mut self, gl: &glow::Context, name: &str, m: &[f32; 16]) {
        if let Some(loc) = self.uniform_location(gl, name) {
            unsafe { gl.uniform_matrix_4_f32_slice(Some(&loc), false, m) };
        }
    }

    /// Scan every active uniform into the location cache
    pub fn find_uniform_locations(&mut self, gl: &glow::Context) {
        unsafe {
            let count = gl.get_active_uniforms(self.program);
            for i in 0..count {
                if let Some(u) = gl.get_active_uniform(self.program, i) {
                    let location = gl.get_uniform_location(self.program, &u.name);
                    self.uniform_locations.insert(u.name, location);
                }
            }
        }
    }

    /// Dump active uniforms to the log
    pub fn log_active_uniforms(&self, gl: &glow::Context) {
        unsafe {
            let count = gl.get_active_uniforms(self.program);
            info!("active uniforms: {}", count);
            for i in 0..count {
                if let Some(u) = gl.get_active_uniform(self.program, i) {
                    info!("  {} {}", gl_type_name(u.utype), u.name);
                }
            }
        }
    }

    /// Dump active vertex attributes to the log
    pub fn log_active_attributes(&self, gl: &glow::Context) {
        unsafe {
            let count = gl.get_active_attributes(self.program);
            info!("active attributes: {}", count);
            for i in 0..count {
                if let Some(a) = gl.get_active_attribute(self.program, i) {
                    info!("  {} {}", gl_type_name(a.atype), a.name);
                }
            }
        }
    }

    /// Release every attached stage handle and the program handle. Safe to
    /// call more than once.
    pub fn destroy(&mut self, gl: &glow::Context) {
        if self.destroyed {
            return;
        }
        unsafe {
            for slot in self.stages.iter_mut() {
                if let Some(shader) = slot.take() {
                    gl.delete_shader(shader);
                }
            }
            gl.delete_program(self.program);
        }
        self.uniform_locations.clear();
        self.linked = false;
        self.destroyed = true;
    }
}

fn gl_type_name(gl_type: u32) -> &'static str {
    match gl_type {
        glow::FLOAT => "float",
        glow::FLOAT_VEC2 => "vec2",
        glow::FLOAT_VEC3 => "vec3",
        glow::FLOAT_VEC4 => "vec4",
        glow::FLOAT_MAT2 => "mat2",
        glow::FLOAT_MAT3 => "mat3",
        glow::FLOAT_MAT4 => "mat4",
        glow::INT => "int",
        glow::UNSIGNED_INT => "uint",
        glow::BOOL => "bool",
        glow::SAMPLER_2D => "sampler2D",
        glow::SAMPLER_3D => "sampler3D",
        glow::SAMPLER_CUBE => "samplerCube",
        _ => "?",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn every_stage_round_trips_through_its_gl_enum() {
        for stage in ShaderStage::ALL {
            assert_eq!(ShaderStage::from_gl(stage.to_gl()).unwrap(), stage);
        }
    }

    #[test]
    fn unrecognized_gl_enum_is_an_invalid_stage() {
        for raw in [0u32, 1, 0x1234, glow::ARRAY_BUFFER, u32::MAX] {
            match ShaderStage::from_gl(raw) {
                Err(ProgramError::InvalidStage(v)) => assert_eq!(v, raw),
                other => panic!("expected InvalidStage for 0x{:x}, got {:?}", raw, other),
            }
        }
    }

    #[test]
    fn stage_slots_are_distinct_and_in_range() {
        let mut seen = [false; ShaderStage::COUNT];
        for stage in ShaderStage::ALL {
            let idx = stage.index();
            assert!(idx < ShaderStage::COUNT);
            assert!(!seen[idx], "slot {} used twice", idx);
            seen[idx] = true;
        }
    }

    #[test]
    fn extension_inference_covers_the_full_table() {
        let cases = [
            ("a.vs", ShaderStage::Vertex),
            ("a.vert", ShaderStage::Vertex),
            ("a.fs", ShaderStage::Fragment),
            ("a.frag", ShaderStage::Fragment),
            ("a.gs", ShaderStage::Geometry),
            ("a.geom", ShaderStage::Geometry),
            ("a.tcs", ShaderStage::TessControl),
            ("a.tes", ShaderStage::TessEvaluation),
            ("a.cs", ShaderStage::Compute),
            ("res/Shaders/triangle.vert", ShaderStage::Vertex),
        ];
        for (path, expected) in cases {
            let got = ShaderStage::from_path(&PathBuf::from(path)).unwrap();
            assert_eq!(got, expected, "path {}", path);
        }
    }

    #[test]
    fn unknown_or_missing_extension_is_rejected() {
        for path in ["a.xyz", "a", "a.", "triangle.glsl"] {
            match ShaderStage::from_path(&PathBuf::from(path)) {
                Err(ProgramError::UnknownExtension(p)) => assert_eq!(p, path),
                other => panic!("expected UnknownExtension for {}, got {:?}", path, other),
            }
        }
    }

    #[test]
    fn compile_message_carries_label_tag_and_driver_log() {
        let msg = compile_error_message(
            "res/Shaders/triangle.vert",
            ShaderStage::Vertex,
            "0:3: syntax error",
        );
        assert_eq!(
            msg,
            "res/Shaders/triangle.vert\nERROR::SHADER::VERTEX::COMPILATION_FAILED\n0:3: syntax error"
        );
    }

    #[test]
    fn every_stage_has_its_own_compile_tag() {
        let tags: Vec<&str> = ShaderStage::ALL.iter().map(|s| s.tag()).collect();
        assert_eq!(
            tags,
            [
                "VERTEX",
                "FRAGMENT",
                "GEOMETRY",
                "TESS_CONTROL",
                "TESS_EVALUATION",
                "COMPUTE"
            ]
        );
    }

    #[test]
    fn link_message_uses_the_program_tag() {
        assert_eq!(
            link_error_message("missing main"),
            "ERROR::SHADER::PROGRAM::LINKING_FAILED\nmissing main"
        );
    }

    #[test]
    fn error_display_is_human_readable() {
        let cases: [(ProgramError, &str); 4] = [
            (ProgramError::NotLinked, "Program was not linked"),
            (
                ProgramError::FileNotFound("triangle.vert".into()),
                "Can't open the file triangle.vert",
            ),
            (
                ProgramError::InvalidStage(0x1234),
                "Invalid shader stage value: 0x1234",
            ),
            (
                ProgramError::UnknownExtension("a.xyz".into()),
                "Unrecognized shader file extension: a.xyz",
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.to_string(), expected);
        }
    }
}
