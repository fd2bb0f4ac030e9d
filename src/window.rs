use crate::{
    compositor::Filter,
    Bitmap,
};

use sdl2::{
    EventPump,
    event::{ Event, WindowEvent },
    keyboard::Keycode,
    video::{ Window, WindowContext },
    render::{ Canvas, TextureCreator, Texture },
    pixels::{ PixelFormatEnum, Color },
    rect::Rect,
};

use image::imageops;

use log::{ debug, info };

const SCROLL_STEP: i32 = 60;
const ZOOM_STEP: f32 = 1.25;
const MIN_ZOOM: f32 = 0.1;
const MAX_ZOOM: f32 = 8.0;

/// Scrollable window showing a long image fitted to the window width.
pub struct Preview{
    pub canvas: Canvas<Window>,
    pub texture_creator: TextureCreator<WindowContext>,
    pub texture: Option<(Texture, u32, u32)>,
    winw: u32,
    winh: u32,
    zoom: f32,
    pan: i32,
    scroll: i32,
}

impl Preview{
    pub fn create(title: &str) -> Result<(Self, EventPump), String>{
        let sdl_context = sdl2::init()?;
        let video_subsystem = sdl_context.video()?;

        let window = video_subsystem
            .window(title, 540, 960)
            .resizable()
            .opengl()
            .build()
            .map_err(|e| e.to_string())?;

        let canvas = window.into_canvas().build().map_err(|e| e.to_string())?;
        let texture_creator = canvas.texture_creator();
        let event_pump = sdl_context.event_pump()?;
        let (winw, winh) = canvas.output_size()?;

        Ok((
            Self{
                canvas,
                texture_creator,
                texture: None,
                winw,
                winh,
                zoom: 1.0,
                pan: 0,
                scroll: 0,
            },
            event_pump
        ))
    }

    /// Uploads `img`, shrinking it first if the renderer cannot hold it.
    pub fn set_texture(&mut self, img: &Bitmap) -> Result<(), String>{
        let info = self.canvas.info();
        let (w, h) = texture_fit(
            img.width(), img.height(), info.max_texture_width, info.max_texture_height,
        );
        let shrunk;
        let img = if (w, h) == img.dimensions() {
            img
        } else {
            debug!("preview: shrinking {}x{} to {w}x{h} for the renderer", img.width(), img.height());
            shrunk = imageops::resize(img, w, h, Filter::Triangle.into());
            &shrunk
        };

        let mut texture = self
            .texture_creator
            .create_texture_static(PixelFormatEnum::RGBA32, w, h)
            .map_err(|e| e.to_string())?;
        texture.update(None, img.as_raw(), 4 * w as usize).map_err(|e| e.to_string())?;
        self.texture = Some((texture, w, h));
        Ok(())
    }

    pub fn redraw(&mut self) -> Result<(), String>{
        self.canvas.set_draw_color(Color::RGB(32, 32, 32));
        self.canvas.clear();
        if let Some((texture, imgw, imgh)) = &self.texture{
            let (x, y, w, h) = view_rect(*imgw, *imgh, self.winw, self.winh, self.zoom, self.pan, self.scroll);
            self.canvas.copy(texture, None, Some(Rect::new(x, y, w, h)))?;
        }
        self.canvas.present();
        Ok(())
    }

    fn scroll_by(&mut self, dy: i32){
        self.scroll = self.scroll.saturating_add(dy);
        self.clamp_scroll();
    }

    fn pan_by(&mut self, dx: i32){
        self.pan = self.pan.saturating_add(dx);
        self.clamp_scroll();
    }

    fn zoom_by(&mut self, factor: f32){
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.clamp_scroll();
    }

    fn clamp_scroll(&mut self){
        if let Some((_, imgw, imgh)) = &self.texture{
            let (_, _, w, h) = view_rect(*imgw, *imgh, self.winw, self.winh, self.zoom, 0, 0);
            (self.pan, self.scroll) = clamp_offset(w, h, self.winw, self.winh, self.pan, self.scroll);
        }
    }

    /// Runs until the window is closed. `save` is called when `s` is pressed.
    pub fn run<F>(mut self, mut event_pump: EventPump, mut save: F) -> Result<(), String>
    where
        F: FnMut() -> Result<(), String>,
    {
        self.redraw()?;
        loop {
            let mut dirty = false;
            for event in event_pump.poll_iter() {
                match event {
                    Event::Quit { .. }
                    | Event::KeyDown { keycode: Some(Keycode::Escape), .. } => {
                        return Ok(());
                    },
                    Event::Window{ win_event: WindowEvent::Resized(winw, winh), .. } => {
                        self.winw = winw.max(0).unsigned_abs();
                        self.winh = winh.max(0).unsigned_abs();
                        self.clamp_scroll();
                        dirty = true;
                    },
                    Event::MouseWheel { y, .. } => {
                        self.scroll_by(-y * SCROLL_STEP);
                        dirty = true;
                    },
                    Event::KeyDown { keycode: Some(kc), .. } => {
                        let page = self.winh as i32;
                        match kc {
                            Keycode::Up => self.scroll_by(-SCROLL_STEP),
                            Keycode::Down => self.scroll_by(SCROLL_STEP),
                            Keycode::Left => self.pan_by(-SCROLL_STEP),
                            Keycode::Right => self.pan_by(SCROLL_STEP),
                            Keycode::PageUp => self.scroll_by(-page),
                            Keycode::PageDown | Keycode::Space => self.scroll_by(page),
                            Keycode::Home => self.scroll_by(i32::MIN),
                            Keycode::End => self.scroll_by(i32::MAX),
                            Keycode::Equals | Keycode::Plus | Keycode::KpPlus => self.zoom_by(ZOOM_STEP),
                            Keycode::Minus | Keycode::KpMinus => self.zoom_by(1.0 / ZOOM_STEP),
                            Keycode::Num0 | Keycode::Kp0 => {
                                self.zoom = 1.0;
                                self.clamp_scroll();
                            },
                            Keycode::S => {
                                save()?;
                                info!("preview: saved");
                            },
                            _ => continue,
                        }
                        dirty = true;
                    },
                    _ => {}
                }
            }
            if dirty {
                self.redraw()?;
            }
            std::thread::sleep(std::time::Duration::from_millis(16));
        }
    }
}

/// Largest size with `img`'s aspect ratio that fits the renderer limits.
/// A limit of 0 means the renderer did not report one.
fn texture_fit(imgw: u32, imgh: u32, maxw: u32, maxh: u32) -> (u32, u32){
    let wfac = if maxw == 0 { 1.0 } else { maxw as f64 / imgw as f64 };
    let hfac = if maxh == 0 { 1.0 } else { maxh as f64 / imgh as f64 };
    let fac = wfac.min(hfac).min(1.0);
    if fac >= 1.0 {
        return (imgw, imgh);
    }
    let w = ((imgw as f64 * fac) as u32).max(1);
    let h = ((imgh as f64 * fac) as u32).max(1);
    (w, h)
}

/// Screen rectangle of the image: fitted to the window width, scaled by
/// `zoom`, centred horizontally when narrower than the window and shifted up by
/// `scroll` and left by `pan`. Short images are centred vertically.
fn view_rect(
    imgw: u32, imgh: u32, winw: u32, winh: u32, zoom: f32, pan: i32, scroll: i32,
) -> (i32, i32, u32, u32){
    let fac = winw as f32 / imgw as f32 * zoom;
    let w = (imgw as f32 * fac) as u32;
    let h = (imgh as f32 * fac) as u32;
    let x = if w < winw { ((winw - w) / 2) as i32 } else { -pan };
    let y = if h < winh { ((winh - h) / 2) as i32 } else { -scroll };
    (x, y, w, h)
}

/// Keeps a `w`x`h` image covering the window: offsets stay between 0 and the
/// overhang on each axis.
fn clamp_offset(w: u32, h: u32, winw: u32, winh: u32, pan: i32, scroll: i32) -> (i32, i32){
    let max_pan = w.saturating_sub(winw).min(i32::MAX as u32) as i32;
    let max_scroll = h.saturating_sub(winh).min(i32::MAX as u32) as i32;
    (pan.clamp(0, max_pan), scroll.clamp(0, max_scroll))
}

#[cfg(test)]
mod tests{

    use super::*;

    #[test]
    fn test_view_rect(){
        let (x, y, w, h) = view_rect(100, 400, 100, 100, 1.0, 0, 0);
        assert_eq!((x, y, w, h), (0, 0, 100, 400));

        let (x, y, w, h) = view_rect(50, 200, 100, 100, 1.0, 0, 150);
        assert_eq!((x, y, w, h), (0, -150, 100, 400));

        let (x, y, w, h) = view_rect(100, 50, 100, 100, 1.0, 0, 0);
        assert_eq!((x, y, w, h), (0, 25, 100, 50));

        let (x, y, w, h) = view_rect(100, 400, 100, 100, 0.5, 30, 20);
        assert_eq!((x, y, w, h), (25, -20, 50, 200));
    }

    #[test]
    fn test_view_rect_zoomed_pans(){
        let (x, y, w, h) = view_rect(100, 400, 100, 100, 2.0, 0, 0);
        assert_eq!((x, y, w, h), (0, 0, 200, 800));

        let (x, _, w, _) = view_rect(100, 400, 100, 100, 2.0, 100, 0);
        assert_eq!(x, -100);
        // right edge of the image lines up with the window's right edge
        assert_eq!(x + w as i32, 100);
    }

    #[test]
    fn test_clamp_offset(){
        assert_eq!(clamp_offset(200, 800, 100, 100, 500, 1000), (100, 700));
        assert_eq!(clamp_offset(200, 800, 100, 100, -5, -5), (0, 0));
        assert_eq!(clamp_offset(50, 200, 100, 100, 40, 40), (0, 40));
        assert_eq!(clamp_offset(100, 400, 100, 100, 60, i32::MAX), (0, 300));
    }

    #[test]
    fn test_texture_fit(){
        assert_eq!(texture_fit(4096, 16384, 8192, 8192), (2048, 8192));
        assert_eq!(texture_fit(1000, 1500, 8192, 8192), (1000, 1500));
        assert_eq!(texture_fit(1000, 1500, 0, 0), (1000, 1500));
        assert_eq!(texture_fit(4096, 16384, 0, 4096), (1024, 4096));
    }
}
