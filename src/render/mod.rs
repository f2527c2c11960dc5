//! Drawing into the host basemap's GL context.
//!
//! The host owns the context, the frame clock, and the framebuffer; this
//! renderer only borrows them for one pass per frame. Driver state is shared
//! with the host renderer, so a known baseline is re-established before every
//! pass and nothing is assumed to persist from the previous frame. The host
//! resets its own state afterwards; no save/restore is attempted here.

use crate::scene::{Material, MeshData, SceneObjectSet, VERTEX_STRIDE};
use glam::DMat4;
use glow::HasContext as _;

/// GPU-resident mesh: vertex array, buffers, and material flags.
#[derive(Debug)]
pub struct GpuMesh {
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    ebo: glow::Buffer,
    index_count: i32,
    material: Material,
}

impl GpuMesh {
    pub fn index_count(&self) -> i32 {
        self.index_count
    }

    pub fn material(&self) -> Material {
        self.material
    }

    /// Handle-only stand-in for registry tests that never touch a context.
    #[cfg(test)]
    pub(crate) fn fake() -> Self {
        use std::num::NonZeroU32;
        let key = NonZeroU32::new(1).unwrap();
        Self {
            vao: glow::NativeVertexArray(key),
            vbo: glow::NativeBuffer(key),
            ebo: glow::NativeBuffer(key),
            index_count: 3,
            material: Material::default(),
        }
    }
}

const VERTEX_SHADER_SOURCE: &str = r#"
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec4 a_color;

uniform mat4 u_matrix;

out vec4 v_color;

void main() {
    v_color = a_color;
    gl_Position = u_matrix * vec4(a_position, 1.0);
}
"#;

const FRAGMENT_SHADER_SOURCE: &str = r#"
#ifdef GL_ES
precision mediump float;
#endif

in vec4 v_color;
out vec4 frag_color;

void main() {
    frag_color = v_color;
}
"#;

/// Renders the whole object set into the host's context.
///
/// One shader program, one pass per frame: each registered object's composed
/// matrix (host projection x local-to-world) is its only per-object uniform,
/// so any number of independently-anchored objects share the pass.
pub struct SceneRenderer {
    program: glow::Program,
    u_matrix: glow::UniformLocation,
}

impl SceneRenderer {
    /// Compiles the shared program against the host's live context.
    pub fn new(gl: &glow::Context) -> Result<Self, String> {
        let shader_version = if gl.version().is_embedded {
            "#version 300 es"
        } else {
            "#version 330"
        };

        unsafe {
            let program = gl
                .create_program()
                .map_err(|e| format!("failed to create program: {}", e))?;

            let vertex = compile_shader(
                gl,
                glow::VERTEX_SHADER,
                &format!("{}\n{}", shader_version, VERTEX_SHADER_SOURCE),
            )?;
            let fragment = compile_shader(
                gl,
                glow::FRAGMENT_SHADER,
                &format!("{}\n{}", shader_version, FRAGMENT_SHADER_SOURCE),
            )?;

            gl.attach_shader(program, vertex);
            gl.attach_shader(program, fragment);
            gl.link_program(program);

            // Shaders are owned by the program once linked.
            gl.detach_shader(program, vertex);
            gl.detach_shader(program, fragment);
            gl.delete_shader(vertex);
            gl.delete_shader(fragment);

            if !gl.get_program_link_status(program) {
                let info = gl.get_program_info_log(program);
                gl.delete_program(program);
                return Err(format!("failed to link program: {}", info));
            }

            let u_matrix = gl
                .get_uniform_location(program, "u_matrix")
                .ok_or_else(|| "missing u_matrix uniform".to_string())?;

            Ok(Self { program, u_matrix })
        }
    }

    /// Uploads a validated mesh and returns its GPU handle.
    pub fn upload_mesh(&self, gl: &glow::Context, data: &MeshData) -> Result<GpuMesh, String> {
        data.validate()?;
        let vertices = data.vertices();

        unsafe {
            let vao = gl
                .create_vertex_array()
                .map_err(|e| format!("failed to create vertex array: {}", e))?;
            let vbo = gl
                .create_buffer()
                .map_err(|e| format!("failed to create vertex buffer: {}", e))?;
            let ebo = gl
                .create_buffer()
                .map_err(|e| format!("failed to create index buffer: {}", e))?;

            gl.bind_vertex_array(Some(vao));

            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(&vertices),
                glow::STATIC_DRAW,
            );

            gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, VERTEX_STRIDE, 0);
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(1, 4, glow::FLOAT, false, VERTEX_STRIDE, 12);
            gl.enable_vertex_attrib_array(1);

            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ebo));
            gl.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                bytemuck::cast_slice(&data.indices),
                glow::STATIC_DRAW,
            );

            // The element binding lives in the VAO; unbind it first.
            gl.bind_vertex_array(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, None);

            Ok(GpuMesh {
                vao,
                vbo,
                ebo,
                index_count: data.indices.len() as i32,
                material: data.material,
            })
        }
    }

    /// Draws every registered object with `host_projection` folded in.
    ///
    /// The composed matrix is recomputed in f64 each call from the fresh host
    /// matrix; nothing camera-dependent is cached across frames.
    pub fn draw(&self, gl: &glow::Context, objects: &SceneObjectSet, host_projection: &DMat4) {
        unsafe {
            self.reset_state(gl);
            gl.use_program(Some(self.program));

            for entry in objects.iter() {
                let composed = *host_projection * entry.matrix;
                gl.uniform_matrix_4_f32_slice(
                    Some(&self.u_matrix),
                    false,
                    &composed.as_mat4().to_cols_array(),
                );

                let material = entry.mesh.material;
                gl.depth_mask(material.depth_write);
                if material.double_sided {
                    gl.disable(glow::CULL_FACE);
                } else {
                    gl.enable(glow::CULL_FACE);
                    gl.cull_face(glow::BACK);
                }

                gl.bind_vertex_array(Some(entry.mesh.vao));
                gl.draw_elements(
                    glow::TRIANGLES,
                    entry.mesh.index_count,
                    glow::UNSIGNED_SHORT,
                    0,
                );
            }

            gl.bind_vertex_array(None);
            gl.use_program(None);
        }
    }

    /// Re-establishes the baseline draw state for this pass.
    ///
    /// The host renderer runs before and after this layer in the same frame
    /// and leaves arbitrary state behind; everything this pass depends on is
    /// set explicitly here.
    fn reset_state(&self, gl: &glow::Context) {
        unsafe {
            gl.disable(glow::SCISSOR_TEST);
            gl.disable(glow::STENCIL_TEST);
            gl.enable(glow::DEPTH_TEST);
            gl.depth_func(glow::LEQUAL);
            gl.depth_mask(true);
            gl.enable(glow::BLEND);
            gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
        }
    }

    /// Releases one mesh's GPU resources.
    pub fn destroy_mesh(&self, gl: &glow::Context, mesh: &GpuMesh) {
        unsafe {
            gl.delete_vertex_array(mesh.vao);
            gl.delete_buffer(mesh.vbo);
            gl.delete_buffer(mesh.ebo);
        }
    }

    /// Releases the program. The context itself belongs to the host.
    pub fn destroy(self, gl: &glow::Context) {
        unsafe {
            gl.delete_program(self.program);
        }
    }
}

fn compile_shader(gl: &glow::Context, kind: u32, source: &str) -> Result<glow::Shader, String> {
    unsafe {
        let shader = gl
            .create_shader(kind)
            .map_err(|e| format!("failed to create shader: {}", e))?;
        gl.shader_source(shader, source);
        gl.compile_shader(shader);
        if !gl.get_shader_compile_status(shader) {
            let info = gl.get_shader_info_log(shader);
            gl.delete_shader(shader);
            return Err(format!("failed to compile shader: {}", info));
        }
        Ok(shader)
    }
}
