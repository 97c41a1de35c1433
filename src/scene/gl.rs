use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glam::{Mat4, Vec3};
use js_sys::{Float32Array, Uint32Array};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    window, HtmlCanvasElement, WebGl2RenderingContext as GL, WebGlProgram, WebGlShader,
    WebGlUniformLocation, WebGlVertexArrayObject,
};

use super::geometry::{dodecahedron, icosahedron, torus_knot, Starfield, WireMesh};
use super::{
    projection, SceneError, SceneParams, Shape, Solid, POINT_LIGHT_POSITION, SOLIDS,
    SPOT_LIGHT_ANGLE, SPOT_LIGHT_DISTANCE, SPOT_LIGHT_PENUMBRA, SPOT_LIGHT_POSITION,
    STAR_TWINKLE_SPEED,
};
use crate::dom::EventSubscription;

const WIRE_VERTEX_SHADER: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;
uniform mat4 u_model;
uniform mat4 u_view;
uniform mat4 u_projection;
out vec3 v_world;
out vec3 v_normal;
out float v_depth;
void main() {
    vec4 world = u_model * vec4(a_position, 1.0);
    vec4 eye = u_view * world;
    v_world = world.xyz;
    v_normal = mat3(u_model) * a_normal;
    v_depth = -eye.z;
    gl_Position = u_projection * eye;
}
"#;

const WIRE_FRAGMENT_SHADER: &str = r#"#version 300 es
precision highp float;
in vec3 v_world;
in vec3 v_normal;
in float v_depth;
uniform vec3 u_tint;
uniform float u_opacity;
uniform float u_shininess;
uniform vec3 u_eye;
uniform vec3 u_spot_position;
uniform float u_spot_intensity;
uniform float u_spot_cos_outer;
uniform float u_spot_cos_inner;
uniform float u_spot_distance;
uniform vec3 u_point_position;
uniform float u_point_intensity;
uniform float u_ambient;
uniform vec3 u_fog_color;
uniform float u_fog_density;
out vec4 out_color;

float range_falloff(float dist, float cutoff) {
    if (cutoff <= 0.0) {
        return 1.0;
    }
    float r = clamp(1.0 - pow(dist / cutoff, 4.0), 0.0, 1.0);
    return r * r;
}

vec3 shade(vec3 n, vec3 to_light, vec3 view_dir, float intensity) {
    float diffuse = abs(dot(n, to_light));
    float specular = 0.0;
    if (u_shininess > 0.0) {
        specular = pow(max(dot(n, normalize(to_light + view_dir)), 0.0), u_shininess);
    }
    return u_tint * intensity * (diffuse + specular);
}

void main() {
    vec3 n = normalize(v_normal);
    vec3 view_dir = normalize(u_eye - v_world);

    vec3 to_spot = u_spot_position - v_world;
    float spot_dist = length(to_spot);
    vec3 spot_dir = to_spot / spot_dist;
    float cone = smoothstep(u_spot_cos_outer, u_spot_cos_inner, dot(-spot_dir, normalize(-u_spot_position)));
    float spot = u_spot_intensity * cone * range_falloff(spot_dist, u_spot_distance);

    vec3 point_dir = normalize(u_point_position - v_world);

    vec3 light = vec3(u_ambient)
        + shade(n, spot_dir, view_dir, spot)
        + shade(n, point_dir, view_dir, u_point_intensity);
    vec3 color = u_tint * light;

    float fog = 1.0 - exp(-u_fog_density * u_fog_density * v_depth * v_depth);
    out_color = vec4(mix(color, u_fog_color, clamp(fog, 0.0, 1.0)), u_opacity);
}
"#;

const STAR_VERTEX_SHADER: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_color;
layout(location = 2) in float a_size;
uniform mat4 u_view;
uniform mat4 u_projection;
uniform float u_time;
uniform vec3 u_tint;
out vec3 v_color;
void main() {
    v_color = mix(a_color, u_tint, 0.2);
    vec4 eye = u_view * vec4(a_position, 1.0);
    gl_PointSize = a_size * (30.0 / -eye.z) * (3.0 + sin(u_time + 100.0));
    gl_Position = u_projection * eye;
}
"#;

const STAR_FRAGMENT_SHADER: &str = r#"#version 300 es
precision highp float;
in vec3 v_color;
uniform float u_opacity;
out vec4 out_color;
void main() {
    float d = distance(gl_PointCoord, vec2(0.5));
    float alpha = 1.0 / (1.0 + exp(16.0 * (d - 0.25)));
    out_color = vec4(v_color, alpha * u_opacity);
}
"#;

fn js_error(value: JsValue) -> SceneError {
    SceneError::Js(format!("{value:?}"))
}

fn compile_shader(gl: &GL, kind: u32, source: &str) -> Result<WebGlShader, SceneError> {
    let shader = gl
        .create_shader(kind)
        .ok_or_else(|| SceneError::ShaderCompile("could not allocate shader".to_string()))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    if gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        let info = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        Err(SceneError::ShaderCompile(info))
    }
}

fn link_program(gl: &GL, vertex: &str, fragment: &str) -> Result<WebGlProgram, SceneError> {
    let vertex = compile_shader(gl, GL::VERTEX_SHADER, vertex)?;
    let fragment = compile_shader(gl, GL::FRAGMENT_SHADER, fragment)?;
    let program = gl
        .create_program()
        .ok_or_else(|| SceneError::ProgramLink("could not allocate program".to_string()))?;

    gl.attach_shader(&program, &vertex);
    gl.attach_shader(&program, &fragment);
    gl.link_program(&program);
    gl.delete_shader(Some(&vertex));
    gl.delete_shader(Some(&fragment));

    if gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(program)
    } else {
        let info = gl.get_program_info_log(&program).unwrap_or_default();
        gl.delete_program(Some(&program));
        Err(SceneError::ProgramLink(info))
    }
}

fn upload_floats(gl: &GL, location: u32, size: i32, data: &[f32]) -> Result<(), SceneError> {
    let buffer = gl
        .create_buffer()
        .ok_or_else(|| SceneError::Js("could not allocate buffer".to_string()))?;
    gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));
    gl.buffer_data_with_array_buffer_view(
        GL::ARRAY_BUFFER,
        &Float32Array::from(data),
        GL::STATIC_DRAW,
    );
    gl.enable_vertex_attrib_array(location);
    gl.vertex_attrib_pointer_with_i32(location, size, GL::FLOAT, false, 0, 0);
    Ok(())
}

fn create_vao(gl: &GL) -> Result<WebGlVertexArrayObject, SceneError> {
    let vao = gl
        .create_vertex_array()
        .ok_or_else(|| SceneError::Js("could not allocate vertex array".to_string()))?;
    gl.bind_vertex_array(Some(&vao));
    Ok(vao)
}

struct Uniforms {
    program: WebGlProgram,
}

impl Uniforms {
    fn get(&self, gl: &GL, name: &str) -> Option<WebGlUniformLocation> {
        gl.get_uniform_location(&self.program, name)
    }

    fn mat4(&self, gl: &GL, name: &str, value: &Mat4) {
        gl.uniform_matrix4fv_with_f32_array(self.get(gl, name).as_ref(), false, &value.to_cols_array());
    }

    fn vec3(&self, gl: &GL, name: &str, value: [f32; 3]) {
        gl.uniform3f(self.get(gl, name).as_ref(), value[0], value[1], value[2]);
    }

    fn float(&self, gl: &GL, name: &str, value: f32) {
        gl.uniform1f(self.get(gl, name).as_ref(), value);
    }
}

struct GpuMesh {
    vao: WebGlVertexArrayObject,
    index_count: i32,
    solid: Solid,
}

impl GpuMesh {
    fn upload(gl: &GL, mesh: &WireMesh, solid: Solid) -> Result<Self, SceneError> {
        let vao = create_vao(gl)?;
        upload_floats(gl, 0, 3, &mesh.positions)?;
        upload_floats(gl, 1, 3, &mesh.normals)?;

        let indices = gl
            .create_buffer()
            .ok_or_else(|| SceneError::Js("could not allocate index buffer".to_string()))?;
        gl.bind_buffer(GL::ELEMENT_ARRAY_BUFFER, Some(&indices));
        gl.buffer_data_with_array_buffer_view(
            GL::ELEMENT_ARRAY_BUFFER,
            &Uint32Array::from(mesh.lines.as_slice()),
            GL::STATIC_DRAW,
        );
        gl.bind_vertex_array(None);

        log::debug!(
            "scene.mesh shape={:?} vertices={} edges={}",
            solid.shape,
            mesh.vertex_count(),
            mesh.edge_count()
        );

        Ok(Self {
            vao,
            index_count: i32::try_from(mesh.edge_count() * 2).unwrap_or(i32::MAX),
            solid,
        })
    }
}

struct Renderer {
    gl: GL,
    canvas: HtmlCanvasElement,
    wire: Uniforms,
    stars: Uniforms,
    meshes: Vec<GpuMesh>,
    star_vao: WebGlVertexArrayObject,
    star_count: i32,
}

impl Renderer {
    fn new(canvas: HtmlCanvasElement, star_count: usize) -> Result<Self, SceneError> {
        let gl = canvas
            .get_context("webgl2")
            .map_err(js_error)?
            .ok_or(SceneError::ContextUnavailable)?
            .dyn_into::<GL>()
            .map_err(|_| SceneError::ContextUnavailable)?;

        let wire = Uniforms {
            program: link_program(&gl, WIRE_VERTEX_SHADER, WIRE_FRAGMENT_SHADER)?,
        };
        let stars = Uniforms {
            program: link_program(&gl, STAR_VERTEX_SHADER, STAR_FRAGMENT_SHADER)?,
        };

        let meshes = SOLIDS
            .iter()
            .map(|solid| {
                let mesh = match solid.shape {
                    Shape::Dodecahedron => dodecahedron(1.0),
                    Shape::Icosahedron => icosahedron(1.0),
                    Shape::TorusKnot => torus_knot(3.0, 0.5, 128, 32, 2, 3),
                };
                GpuMesh::upload(&gl, &mesh, *solid)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let field = Starfield::generate(star_count);
        let star_vao = create_vao(&gl)?;
        upload_floats(&gl, 0, 3, &field.positions)?;
        upload_floats(&gl, 1, 3, &field.colors)?;
        upload_floats(&gl, 2, 1, &field.sizes)?;
        gl.bind_vertex_array(None);

        gl.enable(GL::BLEND);
        gl.blend_func(GL::SRC_ALPHA, GL::ONE_MINUS_SRC_ALPHA);
        gl.disable(GL::DEPTH_TEST);
        gl.clear_color(0.0, 0.0, 0.0, 0.0);

        Ok(Self {
            gl,
            canvas,
            wire,
            stars,
            meshes,
            star_vao,
            star_count: i32::try_from(field.star_count()).unwrap_or(i32::MAX),
        })
    }

    fn resize(&self) {
        let ratio = window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0);
        let width = (f64::from(self.canvas.client_width()) * ratio).round().max(1.0) as u32;
        let height = (f64::from(self.canvas.client_height()) * ratio).round().max(1.0) as u32;

        if self.canvas.width() != width || self.canvas.height() != height {
            self.canvas.set_width(width);
            self.canvas.set_height(height);
        }
        self.gl.viewport(0, 0, width as i32, height as i32);
    }

    fn draw(&self, params: &SceneParams, elapsed: f32) {
        let gl = &self.gl;
        gl.clear(GL::COLOR_BUFFER_BIT);

        let projection = projection(self.canvas.width() as f32, self.canvas.height() as f32);
        let view = params.view(elapsed);
        let eye: Vec3 = params.camera_eye(elapsed);

        gl.use_program(Some(&self.stars.program));
        self.stars.mat4(gl, "u_view", &view);
        self.stars.mat4(gl, "u_projection", &projection);
        self.stars.float(gl, "u_time", elapsed * STAR_TWINKLE_SPEED);
        self.stars.vec3(gl, "u_tint", params.tint.0);
        self.stars.float(gl, "u_opacity", params.star_opacity);
        gl.bind_vertex_array(Some(&self.star_vao));
        gl.draw_arrays(GL::POINTS, 0, self.star_count);

        let wire = &self.wire;
        gl.use_program(Some(&wire.program));
        wire.mat4(gl, "u_view", &view);
        wire.mat4(gl, "u_projection", &projection);
        wire.vec3(gl, "u_eye", eye.to_array());
        wire.vec3(gl, "u_tint", params.tint.0);
        wire.vec3(gl, "u_spot_position", SPOT_LIGHT_POSITION.to_array());
        wire.float(gl, "u_spot_intensity", params.spot_intensity);
        wire.float(gl, "u_spot_cos_outer", SPOT_LIGHT_ANGLE.cos());
        wire.float(gl, "u_spot_cos_inner", (SPOT_LIGHT_ANGLE * (1.0 - SPOT_LIGHT_PENUMBRA)).cos());
        wire.float(gl, "u_spot_distance", SPOT_LIGHT_DISTANCE);
        wire.vec3(gl, "u_point_position", POINT_LIGHT_POSITION.to_array());
        wire.float(gl, "u_point_intensity", params.point_intensity);
        wire.float(gl, "u_ambient", params.ambient_intensity);
        wire.vec3(gl, "u_fog_color", params.fog_color.0);
        wire.float(gl, "u_fog_density", params.fog_density);

        for mesh in &self.meshes {
            wire.mat4(gl, "u_model", &mesh.solid.model(elapsed));
            wire.float(gl, "u_opacity", mesh.solid.opacity);
            wire.float(gl, "u_shininess", mesh.solid.shininess);
            gl.bind_vertex_array(Some(&mesh.vao));
            gl.draw_elements_with_i32(GL::LINES, mesh.index_count, GL::UNSIGNED_INT, 0);
        }

        gl.bind_vertex_array(None);
    }
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// A running scene. Dropping it stops the frame loop and the resize listener.
pub struct SceneHandle {
    params: Rc<Cell<SceneParams>>,
    frame: FrameCallback,
    frame_id: Rc<Cell<Option<i32>>>,
    _resize: EventSubscription,
}

impl SceneHandle {
    pub fn set_params(&self, params: SceneParams) {
        self.params.set(params);
    }
}

impl Drop for SceneHandle {
    fn drop(&mut self) {
        if let (Some(win), Some(id)) = (window(), self.frame_id.take()) {
            let _ = win.cancel_animation_frame(id);
        }
        self.frame.borrow_mut().take();
    }
}

fn request_frame(frame: &FrameCallback, frame_id: &Cell<Option<i32>>) {
    let Some(win) = window() else {
        return;
    };
    if let Some(callback) = frame.borrow().as_ref() {
        frame_id.set(
            win.request_animation_frame(callback.as_ref().unchecked_ref())
                .ok(),
        );
    }
}

pub fn mount(
    canvas: HtmlCanvasElement,
    params: SceneParams,
    star_count: usize,
) -> Result<SceneHandle, SceneError> {
    let renderer = Rc::new(Renderer::new(canvas, star_count)?);
    renderer.resize();

    let resize = {
        let renderer = Rc::clone(&renderer);
        EventSubscription::on_window("resize", true, move |_| renderer.resize()).map_err(js_error)?
    };

    let shared = Rc::new(Cell::new(params));
    let frame: FrameCallback = Rc::new(RefCell::new(None));
    let frame_id = Rc::new(Cell::new(None));

    let callback = {
        let weak_frame = Rc::downgrade(&frame);
        let frame_id = Rc::clone(&frame_id);
        let shared = Rc::clone(&shared);
        let mut started_at: Option<f64> = None;

        Closure::<dyn FnMut(f64)>::new(move |timestamp: f64| {
            let start = *started_at.get_or_insert(timestamp);
            let elapsed = ((timestamp - start) / 1_000.0) as f32;
            renderer.draw(&shared.get(), elapsed);

            if let Some(frame) = weak_frame.upgrade() {
                request_frame(&frame, &frame_id);
            }
        })
    };
    *frame.borrow_mut() = Some(callback);
    request_frame(&frame, &frame_id);

    log::debug!(
        "scene.mounted stars={star_count} solids={} mode={}",
        SOLIDS.len(),
        params.mode.as_str()
    );

    Ok(SceneHandle {
        params: shared,
        frame,
        frame_id,
        _resize: resize,
    })
}
