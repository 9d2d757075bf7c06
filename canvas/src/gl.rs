//! WebGL backend: compiles the point shader and draws a [`RenderFrame`].
//!
//! This module is the only place that touches [`web_sys::WebGlRenderingContext`].
//! It receives a finished frame and produces pixels; it does not mutate any
//! application state. Both vertex buffers are re-uploaded in full on every
//! draw.
//!
//! All fallible WebGL calls propagate errors via `Result<_, JsValue>`.

use js_sys::Float32Array;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{HtmlCanvasElement, WebGlBuffer, WebGlProgram, WebGlRenderingContext as Gl, WebGlShader, WebGlUniformLocation};

use crate::render::RenderFrame;

/// Vertex shader. Keep in step with [`crate::render::to_clip_space`].
const VERTEX_SHADER: &str = r"
attribute vec2 a_position;
attribute vec3 a_color;
varying vec3 v_color;
uniform vec2 u_resolution;
uniform vec2 u_translation;
uniform float u_scale;
uniform float u_point_size;

void main() {
    vec2 position = a_position * u_scale * 2.0 + u_translation;
    vec2 clip = (position / u_resolution) * 2.0 - 1.0;
    gl_Position = vec4(clip * vec2(1, -1), 0, 1);
    gl_PointSize = u_point_size;
    v_color = a_color;
}
";

const FRAGMENT_SHADER: &str = r"
precision mediump float;
varying vec3 v_color;

void main() {
    gl_FragColor = vec4(v_color, 1);
}
";

/// Compiled point program plus its buffers and uniform locations.
pub struct GlRenderer {
    gl: Gl,
    program: WebGlProgram,
    position_buffer: WebGlBuffer,
    color_buffer: WebGlBuffer,
    position_attr: u32,
    color_attr: u32,
    u_resolution: Option<WebGlUniformLocation>,
    u_translation: Option<WebGlUniformLocation>,
    u_scale: Option<WebGlUniformLocation>,
    u_point_size: Option<WebGlUniformLocation>,
}

impl GlRenderer {
    /// Acquire a WebGL context from `canvas` and build the point program.
    ///
    /// # Errors
    ///
    /// Returns `Err` if WebGL is unavailable or the shaders fail to compile/link.
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, JsValue> {
        let gl = canvas
            .get_context("webgl")?
            .ok_or_else(|| JsValue::from_str("webgl context unavailable"))?
            .dyn_into::<Gl>()?;

        let vertex = compile_shader(&gl, Gl::VERTEX_SHADER, VERTEX_SHADER)?;
        let fragment = compile_shader(&gl, Gl::FRAGMENT_SHADER, FRAGMENT_SHADER)?;
        let program = link_program(&gl, &vertex, &fragment)?;

        let position_buffer = gl.create_buffer().ok_or_else(|| JsValue::from_str("failed to create position buffer"))?;
        let color_buffer = gl.create_buffer().ok_or_else(|| JsValue::from_str("failed to create color buffer"))?;
        let position_attr = attrib_location(&gl, &program, "a_position")?;
        let color_attr = attrib_location(&gl, &program, "a_color")?;

        Ok(Self {
            u_resolution: gl.get_uniform_location(&program, "u_resolution"),
            u_translation: gl.get_uniform_location(&program, "u_translation"),
            u_scale: gl.get_uniform_location(&program, "u_scale"),
            u_point_size: gl.get_uniform_location(&program, "u_point_size"),
            gl,
            program,
            position_buffer,
            color_buffer,
            position_attr,
            color_attr,
        })
    }

    /// Upload the frame's buffers and issue one `POINTS` draw.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the vertex count does not fit the WebGL API.
    #[allow(clippy::cast_possible_truncation)]
    pub fn draw(&self, frame: &RenderFrame) -> Result<(), JsValue> {
        let gl = &self.gl;
        let params = &frame.params;
        let count = i32::try_from(frame.buffers.len()).map_err(|_| JsValue::from_str("too many pixels to draw"))?;

        gl.use_program(Some(&self.program));
        gl.uniform2f(self.u_resolution.as_ref(), params.resolution[0], params.resolution[1]);
        gl.uniform2f(self.u_translation.as_ref(), params.translation[0], params.translation[1]);
        gl.uniform1f(self.u_scale.as_ref(), params.scale);
        gl.uniform1f(self.u_point_size.as_ref(), params.point_size);

        upload(gl, &self.position_buffer, self.position_attr, 2, &frame.buffers.positions);
        upload(gl, &self.color_buffer, self.color_attr, 3, &frame.buffers.colors);

        gl.viewport(0, 0, params.resolution[0] as i32, params.resolution[1] as i32);
        gl.clear_color(1.0, 1.0, 1.0, 1.0);
        gl.clear(Gl::COLOR_BUFFER_BIT);
        gl.draw_arrays(Gl::POINTS, 0, count);
        Ok(())
    }
}

fn upload(gl: &Gl, buffer: &WebGlBuffer, attr: u32, components: i32, data: &[f32]) {
    let array = Float32Array::from(data);
    gl.bind_buffer(Gl::ARRAY_BUFFER, Some(buffer));
    gl.buffer_data_with_array_buffer_view(Gl::ARRAY_BUFFER, &array, Gl::STATIC_DRAW);
    gl.enable_vertex_attrib_array(attr);
    gl.vertex_attrib_pointer_with_i32(attr, components, Gl::FLOAT, false, 0, 0);
}

fn compile_shader(gl: &Gl, kind: u32, source: &str) -> Result<WebGlShader, JsValue> {
    let shader = gl.create_shader(kind).ok_or_else(|| JsValue::from_str("failed to create shader"))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);
    if gl.get_shader_parameter(&shader, Gl::COMPILE_STATUS).as_bool().unwrap_or(false) {
        return Ok(shader);
    }
    let log = gl.get_shader_info_log(&shader).unwrap_or_default();
    gl.delete_shader(Some(&shader));
    Err(JsValue::from_str(&format!("shader compile failed: {log}")))
}

fn link_program(gl: &Gl, vertex: &WebGlShader, fragment: &WebGlShader) -> Result<WebGlProgram, JsValue> {
    let program = gl.create_program().ok_or_else(|| JsValue::from_str("failed to create program"))?;
    gl.attach_shader(&program, vertex);
    gl.attach_shader(&program, fragment);
    gl.link_program(&program);
    if gl.get_program_parameter(&program, Gl::LINK_STATUS).as_bool().unwrap_or(false) {
        return Ok(program);
    }
    let log = gl.get_program_info_log(&program).unwrap_or_default();
    gl.delete_program(Some(&program));
    Err(JsValue::from_str(&format!("program link failed: {log}")))
}

fn attrib_location(gl: &Gl, program: &WebGlProgram, name: &str) -> Result<u32, JsValue> {
    u32::try_from(gl.get_attrib_location(program, name))
        .map_err(|_| JsValue::from_str(&format!("missing vertex attribute {name}")))
}
