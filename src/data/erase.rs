// Copyright 2025 the Kupu Authors
// SPDX-License-Identifier: Apache-2.0

//! The erase round trip: masks in, inpainted image out.

use image::GrayImage;
use std::sync::Arc;

use super::{AppError, AppState, ProcessingStatus};
use crate::editing::Action;
use crate::inpaint::{InpaintError, InpaintRequest, Inpainter};
use crate::pipeline::{DataUrl, image_to_data_url, mask_to_data_url};

/// A request built from the current masks, waiting on the service.
#[derive(Debug, Clone)]
pub struct EraseJob {
    pub request: InpaintRequest,
    /// Mask sent with the request, at prep resolution
    pub mask: GrayImage,
}

impl AppState {
    /// Build the request for the committed masks and mark the app busy.
    ///
    /// Fails without side effects when nothing is loaded, no mask is drawn,
    /// or another request is still in flight.
    pub fn begin_erase(&mut self) -> Result<EraseJob, AppError> {
        if self.status.is_processing() {
            return Err(AppError::Busy);
        }
        let document = self.editor.document.as_ref().ok_or(AppError::NoImage)?;
        if self.editor.masks.is_empty() {
            return Err(AppError::NoMasks);
        }

        let mask = document.request_mask(self.editor.masks.masks());
        let request = InpaintRequest {
            image: image_to_data_url(document.prep())?,
            mask: mask_to_data_url(&mask)?,
        };
        tracing::info!(
            "Erasing {} mask(s) on {}x{} prep image",
            self.editor.masks.len(),
            mask.width(),
            mask.height()
        );
        self.status = ProcessingStatus::start();
        Ok(EraseJob { request, mask })
    }

    /// Apply the service's answer to `job`.
    pub fn finish_erase(
        &mut self,
        job: EraseJob,
        outcome: Result<String, InpaintError>,
    ) -> Result<(), AppError> {
        let decoded = outcome.map_err(AppError::from).and_then(|url| {
            let image = DataUrl::parse(&url)?.decode_image()?;
            Ok((url, image))
        });
        match decoded {
            Ok((url, image)) => {
                tracing::info!("Inpaint result {}x{}", image.width(), image.height());
                self.dispatch(Action::InpaintApplied {
                    result: Arc::new(image),
                    mask: job.mask,
                });
                self.history.push(url);
                self.status = ProcessingStatus::Done;
                Ok(())
            }
            Err(err) => {
                let message = err.status_message();
                tracing::error!("Inpainting failed: {}", err);
                // Masks stay in place so the user can retry
                self.status = ProcessingStatus::Failed(message);
                Err(err)
            }
        }
    }

    /// Run one blocking erase against `inpainter`.
    pub fn erase(&mut self, inpainter: &dyn Inpainter) -> Result<(), AppError> {
        let job = self.begin_erase()?;
        let outcome = inpainter.inpaint(&job.request);
        self.finish_erase(job, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::{MaskPath, Mode};
    use image::{Rgba, RgbaImage};
    use kurbo::Point;
    use std::cell::RefCell;

    /// Service stand-in that answers every request with `respond`.
    struct FakeService<F> {
        respond: F,
        requests: RefCell<Vec<InpaintRequest>>,
    }

    impl<F> FakeService<F>
    where
        F: Fn(&InpaintRequest) -> Result<String, InpaintError>,
    {
        fn new(respond: F) -> Self {
            Self {
                respond,
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl<F> Inpainter for FakeService<F>
    where
        F: Fn(&InpaintRequest) -> Result<String, InpaintError>,
    {
        fn inpaint(&self, request: &InpaintRequest) -> Result<String, InpaintError> {
            self.requests.borrow_mut().push(request.clone());
            (self.respond)(request)
        }
    }

    fn solid_result(w: u32, h: u32) -> String {
        image_to_data_url(&RgbaImage::from_pixel(w, h, Rgba([200, 0, 0, 255]))).unwrap()
    }

    fn loaded_state() -> AppState {
        let mut state = AppState::default();
        state.dispatch(Action::Resize {
            width: 800.0,
            height: 600.0,
        });
        state.dispatch(Action::ImageLoaded(Arc::new(RgbaImage::from_pixel(
            200,
            100,
            Rgba([90, 90, 90, 255]),
        ))));
        state
    }

    fn draw_square(state: &mut AppState) {
        state.dispatch(Action::SetMode { mode: Mode::Draw });
        state.dispatch(Action::CommitPath {
            path: MaskPath::from_points(vec![
                Point::new(10.0, 10.0),
                Point::new(60.0, 10.0),
                Point::new(60.0, 60.0),
                Point::new(10.0, 60.0),
            ]),
        });
    }

    #[test]
    fn preconditions() {
        let service = FakeService::new(|_| Ok(solid_result(1, 1)));

        let mut state = AppState::default();
        assert!(matches!(state.erase(&service), Err(AppError::NoImage)));

        let mut state = loaded_state();
        assert!(!state.can_erase());
        assert!(matches!(state.erase(&service), Err(AppError::NoMasks)));
        assert!(service.requests.borrow().is_empty());
    }

    #[test]
    fn successful_erase() {
        let service = FakeService::new(|_| Ok(solid_result(200, 100)));
        let mut state = loaded_state();
        draw_square(&mut state);
        assert!(state.can_erase());

        state.erase(&service).unwrap();

        let requests = service.requests.borrow();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].image.starts_with("data:image/png;base64,"));
        let mask = DataUrl::parse(&requests[0].mask)
            .unwrap()
            .decode_image()
            .unwrap();
        assert_eq!(mask.dimensions(), (200, 100));
        assert_eq!(mask.get_pixel(30, 30).0[0], 255);
        assert_eq!(mask.get_pixel(150, 80).0[0], 0);

        assert_eq!(state.status, ProcessingStatus::Done);
        assert_eq!(state.history.len(), 1);
        assert!(state.editor.masks.is_empty());
        assert_eq!(state.editor.mode, Mode::Pan);
        assert!(state.can_save());

        let export = state.save().unwrap();
        assert!(export.file_name.starts_with("kupu-"));
        assert!(export.file_name.ends_with(".jpg"));
        assert!(state.last_saved.is_some());

        let composite = image::load_from_memory(&export.bytes).unwrap().to_rgb8();
        assert_eq!(composite.dimensions(), (200, 100));
        // Inside the mask the result shows, outside the original is kept
        assert!(composite.get_pixel(30, 30).0[0] > 150);
        assert!(composite.get_pixel(150, 80).0[0] < 120);
    }

    #[test]
    fn timeout_keeps_masks_for_retry() {
        let service = FakeService::new(|_| Err(InpaintError::Timeout));
        let mut state = loaded_state();
        draw_square(&mut state);

        let err = state.erase(&service).unwrap_err();
        assert!(matches!(err, AppError::Inpaint(InpaintError::Timeout)));
        assert_eq!(
            state.status.message().as_deref(),
            Some("Inpainting error, try again")
        );
        assert_eq!(state.editor.masks.len(), 1);
        assert!(state.can_erase());
        assert!(state.history.is_empty());
    }

    #[test]
    fn rate_limit_message() {
        let service = FakeService::new(|_| {
            Err(InpaintError::from_service_message(
                "Rate limit exceeded: 5 per 1 day".into(),
            ))
        });
        let mut state = loaded_state();
        draw_square(&mut state);
        assert!(state.erase(&service).is_err());
        assert_eq!(
            state.status.message().as_deref(),
            Some("The demo trial limit has been reached.")
        );
    }

    #[test]
    fn undecodable_result_is_reported() {
        let service = FakeService::new(|_| Ok("data:image/jpeg;base64,AAAA".to_string()));
        let mut state = loaded_state();
        draw_square(&mut state);
        let err = state.erase(&service).unwrap_err();
        assert!(matches!(err, AppError::Pipeline(_)));
        assert!(
            state
                .status
                .message()
                .is_some_and(|m| m.starts_with("Error: "))
        );
    }

    #[test]
    fn second_request_while_busy_is_refused() {
        let mut state = loaded_state();
        draw_square(&mut state);

        let job = state.begin_erase().unwrap();
        assert!(state.status.is_processing());
        assert!(!state.can_erase());
        assert!(matches!(state.begin_erase(), Err(AppError::Busy)));

        state.finish_erase(job, Ok(solid_result(200, 100))).unwrap();
        assert!(!state.status.is_processing());
    }

    #[test]
    fn history_operations() {
        let service = FakeService::new(|_| Ok(solid_result(200, 100)));
        let mut state = loaded_state();
        draw_square(&mut state);
        state.erase(&service).unwrap();

        let download = state.history_download(0).unwrap();
        assert_eq!(download.file_name, "result-1.png");
        assert!(matches!(
            state.history_download(3),
            Err(AppError::NoSuchResult(3))
        ));

        state.remove_from_history(0).unwrap();
        assert!(state.history.is_empty());
        assert!(state.remove_from_history(0).is_err());
    }
}
